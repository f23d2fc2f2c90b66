//! The ledger store seam.
//!
//! The engine never touches storage directly: every figure it reports comes
//! from one of the grouped queries below. Implementations must be read-only
//! for the duration of a call and must apply the category resolution rules of
//! [`CategoryResolver`] where a query returns categories.
//!
//! [`CategoryResolver`]: crate::CategoryResolver

use std::future::Future;

use chrono::NaiveDate;

use crate::{BudgetLimit, CategoryAmount, CategorySpend, MonthFlow, Period, ResultEngine, Totals};

pub use memory::MemoryLedger;
pub use sql::{BatchOutcome, SqlLedgerStore};

mod memory;
mod sql;

pub trait LedgerStore: Send + Sync {
    /// Income (positive amounts), expenses (negative amounts, sign kept) and
    /// net of the user's transactions in `period`.
    fn sum_totals_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> impl Future<Output = ResultEngine<Totals>> + Send;

    /// Signed sum per resolved category name.
    fn sum_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> impl Future<Output = ResultEngine<Vec<CategoryAmount>>> + Send;

    /// Income and expenses per calendar month, only for months with activity.
    fn sum_by_month_in_year(
        &self,
        user_id: i64,
        year: Period,
    ) -> impl Future<Output = ResultEngine<Vec<MonthFlow>>> + Send;

    /// Carry-forward limits in force during the month starting at `as_of`.
    fn active_budget_definitions(
        &self,
        user_id: i64,
        as_of: NaiveDate,
    ) -> impl Future<Output = ResultEngine<Vec<BudgetLimit>>> + Send;

    /// Sum of expense magnitudes per resolved category id.
    fn spend_by_category_in_range(
        &self,
        user_id: i64,
        period: Period,
    ) -> impl Future<Output = ResultEngine<Vec<CategorySpend>>> + Send;
}
