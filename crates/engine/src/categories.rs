//! Canonical category registry.
//!
//! Categories are shared reference data: every user resolves labels against
//! the same set. The system "Uncategorized" row is seeded by the migrations.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub(crate) const UNCATEGORIZED_NAME_NORM: &str = "uncategorized";

/// Category exposed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub is_system: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_system: false,
        }
    }

    pub(crate) fn uncategorized(id: Uuid) -> Self {
        Self {
            id,
            name: UNCATEGORIZED_NAME.to_string(),
            is_system: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub is_system: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category_aliases::Entity")]
    Aliases,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::category_aliases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aliases.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            is_system: model.is_system,
        }
    }
}
