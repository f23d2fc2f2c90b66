//! Monthly budget definitions and the carry-forward rule.
//!
//! A definition sets a category's limit from its effective month onwards,
//! until a later definition for the same category supersedes it. Each category
//! is resolved on its own, so two categories in the same report can be
//! governed by definitions from different months.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{BudgetLimit, MoneyCents, aggregation::sort_budget_limits};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetDefinition {
    pub id: Uuid,
    pub user_id: i64,
    pub category_id: Uuid,
    pub category_name: String,
    /// First day of the effective month.
    pub month: NaiveDate,
    pub limit: MoneyCents,
}

impl BudgetDefinition {
    /// Whether `self` should win over `current` as the definition in force.
    ///
    /// The latest month wins. Same-month duplicates cannot be stored, but if
    /// they ever reach this point the higher limit wins, then the lower id.
    fn supersedes(&self, current: &BudgetDefinition) -> bool {
        self.month
            .cmp(&current.month)
            .then_with(|| self.limit.cmp(&current.limit))
            .then_with(|| current.id.cmp(&self.id))
            .is_gt()
    }
}

/// Limits in force during `month` (the first day of the requested month).
///
/// Every category that ever had a definition is considered; the one with the
/// latest effective month `<= month` wins. Categories whose definitions all
/// start after `month` have no active budget and are left out.
///
/// The result is ordered by category name, then category id.
pub fn carry_forward(definitions: &[BudgetDefinition], month: NaiveDate) -> Vec<BudgetLimit> {
    let mut in_force: BTreeMap<Uuid, Option<&BudgetDefinition>> = BTreeMap::new();

    for definition in definitions {
        let slot = in_force.entry(definition.category_id).or_insert(None);
        if definition.month > month {
            continue;
        }
        if slot.is_none_or(|current| definition.supersedes(current)) {
            *slot = Some(definition);
        }
    }

    let mut limits: Vec<BudgetLimit> = in_force
        .into_values()
        .flatten()
        .map(|definition| BudgetLimit {
            category_id: definition.category_id,
            category_name: definition.category_name.clone(),
            limit: definition.limit,
        })
        .collect();
    sort_budget_limits(&mut limits);
    limits
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i64,
    pub category_id: Uuid,
    pub month: Date,
    pub limit_minor: i64,
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

impl From<&BudgetDefinition> for ActiveModel {
    fn from(definition: &BudgetDefinition) -> Self {
        Self {
            id: ActiveValue::Set(definition.id),
            user_id: ActiveValue::Set(definition.user_id),
            category_id: ActiveValue::Set(definition.category_id),
            month: ActiveValue::Set(definition.month),
            limit_minor: ActiveValue::Set(definition.limit.cents()),
        }
    }
}

impl BudgetDefinition {
    pub(crate) fn from_model(model: Model, category_name: String) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            category_name,
            month: model.month,
            limit: MoneyCents::new(model.limit_minor),
        }
    }
}
