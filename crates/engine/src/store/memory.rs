//! In-memory ledger backed by plain vectors.
//!
//! Applies the same resolution and carry-forward rules as the SQL store, which
//! makes it the reference the SQL queries are checked against in tests.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
    BudgetDefinition, BudgetLimit, Category, CategoryAlias, CategoryAmount, CategoryResolver,
    CategorySpend, EngineError, LedgerStore, MoneyCents, MonthFlow, Period, ResultEngine, Totals,
    Transaction, budgets::carry_forward, categories::UNCATEGORIZED_NAME,
    util::{first_of_month, normalize_category_key, required_label},
};

#[derive(Clone, Debug)]
pub struct MemoryLedger {
    categories: Vec<Category>,
    aliases: Vec<CategoryAlias>,
    transactions: Vec<Transaction>,
    budgets: Vec<BudgetDefinition>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// An empty ledger holding only the system "Uncategorized" category.
    pub fn new() -> Self {
        Self {
            categories: vec![Category {
                id: Uuid::new_v4(),
                name: UNCATEGORIZED_NAME.to_string(),
                is_system: true,
            }],
            aliases: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
        }
    }

    pub fn add_category(&mut self, name: &str) -> ResultEngine<Category> {
        let (display, key) = required_label(name, "category name")?;
        if self.category_by_key(&key).is_some() {
            return Err(EngineError::ExistingKey(display));
        }
        let category = Category::new(display);
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn add_alias(&mut self, alias: &str, category_id: Uuid) -> ResultEngine<CategoryAlias> {
        let (display, key) = required_label(alias, "alias")?;
        if !self.categories.iter().any(|c| c.id == category_id) {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        let taken = self.category_by_key(&key).is_some()
            || self
                .aliases
                .iter()
                .any(|a| normalize_category_key(&a.alias).as_deref() == Some(key.as_str()));
        if taken {
            return Err(EngineError::ExistingKey(display));
        }
        let alias = CategoryAlias::new(display, category_id);
        self.aliases.push(alias.clone());
        Ok(alias)
    }

    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Adds a definition effective from the month containing `month`.
    pub fn set_budget(
        &mut self,
        user_id: i64,
        category_id: Uuid,
        month: NaiveDate,
        limit: MoneyCents,
    ) -> ResultEngine<BudgetDefinition> {
        if limit.is_negative() {
            return Err(EngineError::InvalidAmount(
                "budget limit must be >= 0".to_string(),
            ));
        }
        let category = self
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        let month = first_of_month(month);
        if self
            .budgets
            .iter()
            .any(|b| b.user_id == user_id && b.category_id == category_id && b.month == month)
        {
            return Err(EngineError::ExistingKey(format!(
                "budget for {} in {}",
                category.name,
                month.format("%Y-%m")
            )));
        }

        let definition = BudgetDefinition {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            category_name: category.name.clone(),
            month,
            limit,
        };
        self.budgets.push(definition.clone());
        Ok(definition)
    }

    pub fn resolver(&self) -> CategoryResolver {
        CategoryResolver::new(self.categories.clone(), self.aliases.clone())
    }

    fn category_by_key(&self, key: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| normalize_category_key(&c.name).as_deref() == Some(key))
    }

    fn in_range(&self, user_id: i64, period: Period) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |tx| tx.user_id == user_id && period.contains(tx.occurred_on))
    }
}

impl LedgerStore for MemoryLedger {
    async fn sum_totals_in_range(&self, user_id: i64, period: Period) -> ResultEngine<Totals> {
        let mut totals = Totals::default();
        for tx in self.in_range(user_id, period) {
            totals.record(tx.amount);
        }
        Ok(totals)
    }

    async fn sum_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategoryAmount>> {
        let resolver = self.resolver();
        let mut by_category: HashMap<Uuid, CategoryAmount> = HashMap::new();
        for tx in self.in_range(user_id, period) {
            let category = resolver.resolve(tx.category.as_deref());
            by_category
                .entry(category.id)
                .or_insert_with(|| CategoryAmount {
                    category: category.name.clone(),
                    amount: MoneyCents::ZERO,
                })
                .amount += tx.amount;
        }
        Ok(by_category.into_values().collect())
    }

    async fn sum_by_month_in_year(
        &self,
        user_id: i64,
        year: Period,
    ) -> ResultEngine<Vec<MonthFlow>> {
        let mut by_month: HashMap<u32, MonthFlow> = HashMap::new();
        for tx in self.in_range(user_id, year) {
            let month = tx.occurred_on.month();
            let flow = by_month.entry(month).or_insert(MonthFlow {
                month,
                ..MonthFlow::default()
            });
            if tx.amount.is_positive() {
                flow.income += tx.amount;
            } else {
                flow.expenses += tx.amount;
            }
        }
        Ok(by_month.into_values().collect())
    }

    async fn active_budget_definitions(
        &self,
        user_id: i64,
        as_of: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        let definitions: Vec<BudgetDefinition> = self
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        Ok(carry_forward(&definitions, first_of_month(as_of)))
    }

    async fn spend_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategorySpend>> {
        let resolver = self.resolver();
        let mut by_category: HashMap<Uuid, CategorySpend> = HashMap::new();
        for tx in self.in_range(user_id, period) {
            let category = resolver.resolve(tx.category.as_deref());
            let row = by_category
                .entry(category.id)
                .or_insert_with(|| CategorySpend {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    spent: MoneyCents::ZERO,
                });
            if tx.amount.is_negative() {
                row.spent += tx.amount.abs();
            }
        }
        Ok(by_category.into_values().collect())
    }
}
