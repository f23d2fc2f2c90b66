//! Category aliases: alternative spellings that point at a canonical category.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Alias entry exposed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryAlias {
    pub id: Uuid,
    pub alias: String,
    pub category_id: Uuid,
}

impl CategoryAlias {
    pub fn new(alias: impl Into<String>, category_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            alias: alias.into(),
            category_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_aliases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub alias: String,
    pub alias_norm: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CategoryAlias {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            alias: model.alias,
            category_id: model.category_id,
        }
    }
}
