use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::Engine;
use crate::{
    BudgetLimit, CategoryAmount, CategorySpend, LedgerStore, MonthFlow, Period, ResultEngine,
    Totals, aggregation::sort_budget_limits, calendar_year, merge_category_amounts,
    merge_month_flows, merge_spend, util::first_of_month,
};

impl<S: LedgerStore> Engine<S> {
    /// Income, expenses and net in `period`. An empty window yields zeros.
    pub async fn aggregate_totals(&self, user_id: i64, period: Period) -> ResultEngine<Totals> {
        self.bounded("totals", self.totals(user_id, period)).await
    }

    /// Signed amount per resolved category, largest first.
    pub async fn aggregate_by_category(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategoryAmount>> {
        self.bounded("by_category", self.by_category(user_id, period))
            .await
    }

    /// Income and expenses keyed by month number. Months without
    /// transactions are absent.
    pub async fn aggregate_by_month(
        &self,
        user_id: i64,
        year: i32,
    ) -> ResultEngine<BTreeMap<u32, MonthFlow>> {
        let year = calendar_year(year)?;
        self.bounded("by_month", self.by_month(user_id, year)).await
    }

    /// Expense magnitude per resolved category.
    pub async fn aggregate_spend_by_category(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategorySpend>> {
        self.bounded("spend_by_category", self.spend(user_id, period))
            .await
    }

    /// Limits in force during the month containing `month`.
    pub async fn active_budgets(
        &self,
        user_id: i64,
        month: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        self.bounded("active_budgets", self.limits(user_id, month))
            .await
    }

    pub(super) async fn totals(&self, user_id: i64, period: Period) -> ResultEngine<Totals> {
        if period.is_empty() {
            return Ok(Totals::default());
        }
        self.store.sum_totals_in_range(user_id, period).await
    }

    pub(super) async fn by_category(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategoryAmount>> {
        if period.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.store.sum_by_category_in_range(user_id, period).await?;
        Ok(merge_category_amounts(rows))
    }

    pub(super) async fn by_month(
        &self,
        user_id: i64,
        year: Period,
    ) -> ResultEngine<BTreeMap<u32, MonthFlow>> {
        let rows = self.store.sum_by_month_in_year(user_id, year).await?;
        Ok(merge_month_flows(rows))
    }

    pub(super) async fn spend(
        &self,
        user_id: i64,
        period: Period,
    ) -> ResultEngine<Vec<CategorySpend>> {
        let rows = self.store.spend_by_category_in_range(user_id, period).await?;
        Ok(merge_spend(rows))
    }

    pub(super) async fn limits(
        &self,
        user_id: i64,
        month: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        let mut limits = self
            .store
            .active_budget_definitions(user_id, first_of_month(month))
            .await?;
        sort_budget_limits(&mut limits);
        Ok(limits)
    }
}
