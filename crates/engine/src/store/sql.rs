//! SQLite ledger store.
//!
//! Grouping happens in SQL. Category labels are grouped raw (as typed by the
//! user) and resolved afterwards with a [`CategoryResolver`] built from the
//! reference tables, so labels that resolve to the same category collapse
//! into a single row.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, QueryResult, Statement,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetDefinition, BudgetLimit, Category, CategoryAlias, CategoryAmount, CategoryResolver,
    CategorySpend, EngineError, LedgerStore, MoneyCents, MonthFlow, Period, ResultEngine, Totals,
    Transaction, budgets, budgets::carry_forward, categories, category_aliases, transactions,
    util::{first_of_month, required_label},
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

const TOTALS_SQL: &str = "\
SELECT
    COALESCE(SUM(CASE WHEN amount_minor > 0 THEN amount_minor ELSE 0 END), 0) AS income,
    COALESCE(SUM(CASE WHEN amount_minor < 0 THEN amount_minor ELSE 0 END), 0) AS expenses
FROM transactions
WHERE user_id = ? AND occurred_on >= ? AND occurred_on < ?;";

const LABEL_SUMS_SQL: &str = "\
SELECT
    category,
    SUM(amount_minor) AS amount,
    SUM(CASE WHEN amount_minor < 0 THEN -amount_minor ELSE 0 END) AS spent
FROM transactions
WHERE user_id = ? AND occurred_on >= ? AND occurred_on < ?
GROUP BY category;";

const MONTH_SUMS_SQL: &str = "\
SELECT
    CAST(strftime('%m', occurred_on) AS INTEGER) AS month,
    COALESCE(SUM(CASE WHEN amount_minor > 0 THEN amount_minor ELSE 0 END), 0) AS income,
    COALESCE(SUM(CASE WHEN amount_minor < 0 THEN amount_minor ELSE 0 END), 0) AS expenses
FROM transactions
WHERE user_id = ? AND occurred_on >= ? AND occurred_on < ?
GROUP BY month
ORDER BY month;";

/// Sums of one raw label.
struct LabelSum {
    label: Option<String>,
    amount: MoneyCents,
    spent: MoneyCents,
}

/// Result of [`SqlLedgerStore::record_transactions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug)]
pub struct SqlLedgerStore {
    database: DatabaseConnection,
}

impl SqlLedgerStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Snapshot of the category reference data.
    pub async fn resolver(&self) -> ResultEngine<CategoryResolver> {
        let categories = categories::Entity::find().all(&self.database).await?;
        let aliases = category_aliases::Entity::find().all(&self.database).await?;
        Ok(CategoryResolver::new(
            categories.into_iter().map(Category::from),
            aliases.into_iter().map(CategoryAlias::from),
        ))
    }

    fn range_statement(&self, sql: &str, user_id: i64, period: Period) -> Statement {
        Statement::from_sql_and_values(
            self.database.get_database_backend(),
            sql,
            vec![
                user_id.into(),
                period.start().into(),
                period.end_exclusive().into(),
            ],
        )
    }

    async fn label_sums(&self, user_id: i64, period: Period) -> ResultEngine<Vec<LabelSum>> {
        let rows = self
            .database
            .query_all(self.range_statement(LABEL_SUMS_SQL, user_id, period))
            .await?;
        rows.iter()
            .map(|row| -> ResultEngine<LabelSum> {
                Ok(LabelSum {
                    label: row.try_get("", "category")?,
                    amount: money(row, "amount")?,
                    spent: money(row, "spent")?,
                })
            })
            .collect()
    }

    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Looks a category up by display name (case-insensitive), or by alias.
    pub async fn find_category(&self, name: &str) -> ResultEngine<Category> {
        let (display, key) = required_label(name, "category name")?;
        if let Some(model) = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(key.clone()))
            .one(&self.database)
            .await?
        {
            return Ok(model.into());
        }
        if let Some((_, Some(model))) = category_aliases::Entity::find()
            .filter(category_aliases::Column::AliasNorm.eq(key))
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
        {
            return Ok(model.into());
        }
        Err(EngineError::KeyNotFound(display))
    }

    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let (display, key) = required_label(name, "category name")?;
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(key.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                Err(EngineError::ExistingKey(display))
            } else {
                let category = Category::new(display);
                categories::ActiveModel {
                    id: ActiveValue::Set(category.id),
                    name: ActiveValue::Set(category.name.clone()),
                    name_norm: ActiveValue::Set(key),
                    is_system: ActiveValue::Set(false),
                }
                .insert(&db_tx)
                .await?;
                Ok(category)
            }
        })
    }

    /// Adds an alias. Rejects labels already used by a category name or by
    /// another alias.
    pub async fn create_alias(&self, alias: &str, category_id: Uuid) -> ResultEngine<CategoryAlias> {
        let (display, key) = required_label(alias, "alias")?;
        with_tx!(self, |db_tx| {
            let category = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?;
            let name_taken = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(key.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            let alias_taken = category_aliases::Entity::find()
                .filter(category_aliases::Column::AliasNorm.eq(key.clone()))
                .one(&db_tx)
                .await?
                .is_some();

            if category.is_none() {
                Err(EngineError::KeyNotFound("category not exists".to_string()))
            } else if name_taken || alias_taken {
                Err(EngineError::ExistingKey(display))
            } else {
                let alias = CategoryAlias::new(display, category_id);
                category_aliases::ActiveModel {
                    id: ActiveValue::Set(alias.id),
                    category_id: ActiveValue::Set(category_id),
                    alias: ActiveValue::Set(alias.alias.clone()),
                    alias_norm: ActiveValue::Set(key),
                }
                .insert(&db_tx)
                .await?;
                Ok(alias)
            }
        })
    }

    /// Stores a definition effective from the month containing `month`.
    ///
    /// An existing definition for the same (user, category, month) is an
    /// `ExistingKey` error unless `replace` is set, in which case its limit is
    /// overwritten.
    pub async fn set_budget(
        &self,
        user_id: i64,
        category_id: Uuid,
        month: NaiveDate,
        limit: MoneyCents,
        replace: bool,
    ) -> ResultEngine<BudgetDefinition> {
        if limit.is_negative() {
            return Err(EngineError::InvalidAmount(
                "budget limit must be >= 0".to_string(),
            ));
        }
        let month = first_of_month(month);
        with_tx!(self, |db_tx| {
            let category = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()));
            match category {
                Err(err) => Err(err),
                Ok(category) => {
                    let existing = budgets::Entity::find()
                        .filter(budgets::Column::UserId.eq(user_id))
                        .filter(budgets::Column::CategoryId.eq(category_id))
                        .filter(budgets::Column::Month.eq(month))
                        .one(&db_tx)
                        .await?;
                    match existing {
                        Some(_) if !replace => Err(EngineError::ExistingKey(format!(
                            "budget for {} in {}",
                            category.name,
                            month.format("%Y-%m")
                        ))),
                        Some(model) => {
                            let mut active: budgets::ActiveModel = model.into();
                            active.limit_minor = ActiveValue::Set(limit.cents());
                            let model = active.update(&db_tx).await?;
                            Ok(BudgetDefinition::from_model(model, category.name))
                        }
                        None => {
                            let definition = BudgetDefinition {
                                id: Uuid::new_v4(),
                                user_id,
                                category_id,
                                category_name: category.name,
                                month,
                                limit,
                            };
                            budgets::ActiveModel::from(&definition)
                                .insert(&db_tx)
                                .await?;
                            Ok(definition)
                        }
                    }
                }
            }
        })
    }

    pub async fn record_transaction(&self, transaction: &Transaction) -> ResultEngine<Uuid> {
        transactions::ActiveModel::from(transaction)
            .insert(&self.database)
            .await?;
        Ok(transaction.id)
    }

    /// Inserts a batch atomically: either every new transaction is stored or
    /// none. Rows whose import key is already stored for the same user
    /// (including earlier rows of the same batch) are skipped.
    pub async fn record_transactions(&self, batch: &[Transaction]) -> ResultEngine<BatchOutcome> {
        with_tx!(self, |db_tx| {
            let mut outcome = BatchOutcome::default();
            for transaction in batch {
                if let Some(key) = transaction.import_key.as_deref() {
                    let existing = transactions::Entity::find()
                        .filter(transactions::Column::UserId.eq(transaction.user_id))
                        .filter(transactions::Column::ImportKey.eq(key.to_string()))
                        .one(&db_tx)
                        .await?;
                    if existing.is_some() {
                        outcome.skipped += 1;
                        continue;
                    }
                }
                transactions::ActiveModel::from(transaction)
                    .insert(&db_tx)
                    .await?;
                outcome.inserted += 1;
            }
            Ok::<BatchOutcome, EngineError>(outcome)
        })
    }
}

fn money(row: &QueryResult, column: &str) -> ResultEngine<MoneyCents> {
    Ok(MoneyCents::new(row.try_get::<i64>("", column)?))
}

impl LedgerStore for SqlLedgerStore {
    async fn sum_totals_in_range(&self, user_id: i64, period: Period) -> ResultEngine<Totals> {
        let row = self
            .database
            .query_one(self.range_statement(TOTALS_SQL, user_id, period))
            .await?;
        match row {
            Some(row) => Ok(Totals::new(money(&row, "income")?, money(&row, "expenses")?)),
            None => Ok(Totals::default()),
        }
    }

    async fn sum_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategoryAmount>> {
        let resolver = self.resolver().await?;
        let mut by_category: HashMap<Uuid, CategoryAmount> = HashMap::new();
        for sum in self.label_sums(user_id, period).await? {
            let category = resolver.resolve(sum.label.as_deref());
            by_category
                .entry(category.id)
                .or_insert_with(|| CategoryAmount {
                    category: category.name.clone(),
                    amount: MoneyCents::ZERO,
                })
                .amount += sum.amount;
        }
        Ok(by_category.into_values().collect())
    }

    async fn sum_by_month_in_year(
        &self,
        user_id: i64,
        year: Period,
    ) -> ResultEngine<Vec<MonthFlow>> {
        let rows = self
            .database
            .query_all(self.range_statement(MONTH_SUMS_SQL, user_id, year))
            .await?;
        rows.iter()
            .map(|row| -> ResultEngine<MonthFlow> {
                let month: i64 = row.try_get("", "month")?;
                Ok(MonthFlow {
                    // Anything unrepresentable becomes 0, which the cashflow
                    // assembler drops.
                    month: u32::try_from(month).unwrap_or(0),
                    income: money(row, "income")?,
                    expenses: money(row, "expenses")?,
                })
            })
            .collect()
    }

    async fn active_budget_definitions(
        &self,
        user_id: i64,
        as_of: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        let rows = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;
        let definitions: Vec<BudgetDefinition> = rows
            .into_iter()
            .filter_map(|(budget, category)| {
                category.map(|category| BudgetDefinition::from_model(budget, category.name))
            })
            .collect();
        Ok(carry_forward(&definitions, first_of_month(as_of)))
    }

    async fn spend_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategorySpend>> {
        let resolver = self.resolver().await?;
        let mut by_category: HashMap<Uuid, CategorySpend> = HashMap::new();
        for sum in self.label_sums(user_id, period).await? {
            let category = resolver.resolve(sum.label.as_deref());
            by_category
                .entry(category.id)
                .or_insert_with(|| CategorySpend {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    spent: MoneyCents::ZERO,
                })
                .spent += sum.spent;
        }
        Ok(by_category.into_values().collect())
    }
}
