//! Partial aggregates returned by a [`LedgerStore`] and the pure merge rules
//! the engine applies on top of them.
//!
//! Stores may hand back rows in any order and may split one logical group
//! over several rows (e.g. two raw labels resolving to the same category).
//! The functions here fold those rows into exactly one row per key and impose
//! a deterministic order.
//!
//! [`LedgerStore`]: crate::LedgerStore

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::MoneyCents;

/// Income, expenses and net over a window.
///
/// `expenses` keeps its sign (always `<= 0`), so `net = income + expenses`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: MoneyCents,
    pub expenses: MoneyCents,
    pub net: MoneyCents,
}

impl Totals {
    pub fn new(income: MoneyCents, expenses: MoneyCents) -> Self {
        Self {
            income,
            expenses,
            net: income + expenses,
        }
    }

    /// Folds one signed amount into the totals.
    pub fn record(&mut self, amount: MoneyCents) {
        if amount.is_positive() {
            self.income += amount;
        } else {
            self.expenses += amount;
        }
        self.net = self.income + self.expenses;
    }
}

/// Signed sum of one resolved category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: MoneyCents,
}

/// Income and expenses of one calendar month (`1..=12`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthFlow {
    pub month: u32,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
}

impl MonthFlow {
    pub fn net(&self) -> MoneyCents {
        self.income + self.expenses
    }
}

/// Limit in force for a category in a given month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetLimit {
    pub category_id: Uuid,
    pub category_name: String,
    pub limit: MoneyCents,
}

/// Spending (as a non-negative magnitude) of one resolved category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySpend {
    pub category_id: Uuid,
    pub category_name: String,
    pub spent: MoneyCents,
}

/// One row per category name, ordered by amount descending then name.
pub fn merge_category_amounts(
    rows: impl IntoIterator<Item = CategoryAmount>,
) -> Vec<CategoryAmount> {
    let mut by_name: HashMap<String, MoneyCents> = HashMap::new();
    for row in rows {
        *by_name.entry(row.category).or_default() += row.amount;
    }

    let mut merged: Vec<CategoryAmount> = by_name
        .into_iter()
        .map(|(category, amount)| CategoryAmount { category, amount })
        .collect();
    merged.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    merged
}

/// Sums rows sharing a month number. Months outside `1..=12` are kept; the
/// cashflow assembler decides what to do with them.
pub fn merge_month_flows(rows: impl IntoIterator<Item = MonthFlow>) -> BTreeMap<u32, MonthFlow> {
    let mut by_month: BTreeMap<u32, MonthFlow> = BTreeMap::new();
    for row in rows {
        let entry = by_month.entry(row.month).or_insert(MonthFlow {
            month: row.month,
            ..MonthFlow::default()
        });
        entry.income += row.income;
        entry.expenses += row.expenses;
    }
    by_month
}

/// One row per category id, spent summed. The first name seen for an id is
/// kept. Ordered by spent descending, then name, then id.
pub fn merge_spend(rows: impl IntoIterator<Item = CategorySpend>) -> Vec<CategorySpend> {
    let mut by_id: HashMap<Uuid, CategorySpend> = HashMap::new();
    for row in rows {
        by_id
            .entry(row.category_id)
            .and_modify(|existing| existing.spent += row.spent)
            .or_insert(row);
    }

    let mut merged: Vec<CategorySpend> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.spent
            .cmp(&a.spent)
            .then_with(|| a.category_name.cmp(&b.category_name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    merged
}

/// Orders limits by display name (case-sensitive as stored), then id.
pub fn sort_budget_limits(limits: &mut [BudgetLimit]) {
    limits.sort_by(|a, b| {
        a.category_name
            .cmp(&b.category_name)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
}
