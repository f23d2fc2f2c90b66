use chrono::{Datelike, NaiveDate};

use super::{Engine, token};
use crate::{
    BudgetReport, CashflowReport, LedgerStore, ResultEngine, SummaryReport, assemble_budget,
    assemble_cashflow, assemble_summary, month_period, parse_date, parse_month, parse_year,
    resolve_period, year_period,
};

impl<S: LedgerStore> Engine<S> {
    /// Totals and category breakdown over an inclusive `from..=to` window.
    ///
    /// Missing bounds default to the start of the year and to `today`. Tokens
    /// are validated before the store is queried.
    pub async fn summary(
        &self,
        user_id: i64,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<SummaryReport> {
        let from = token(from).map(|t| parse_date("from", t)).transpose()?;
        let to = token(to).map(|t| parse_date("to", t)).transpose()?;
        let period = resolve_period(from, to, today)?;
        tracing::debug!(
            user_id,
            start = %period.start(),
            end_exclusive = %period.end_exclusive(),
            "summary window"
        );

        let (totals, by_category) = self
            .bounded("summary", async {
                tokio::try_join!(
                    self.totals(user_id, period),
                    self.by_category(user_id, period)
                )
            })
            .await?;

        Ok(assemble_summary(period, totals, by_category))
    }

    /// Twelve months of income, expenses and net for `year` (default: the
    /// year of `today`).
    pub async fn cashflow(
        &self,
        user_id: i64,
        year: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<CashflowReport> {
        let year = token(year).map(parse_year).transpose()?;
        let period = year_period(year, today)?;
        tracing::debug!(user_id, year = period.start().year(), "cashflow window");

        let months = self
            .bounded("cashflow", self.by_month(user_id, period))
            .await?;

        Ok(assemble_cashflow(period.start().year(), months.into_values()))
    }

    /// Budget limits against spending for `month` (default: the month of
    /// `today`).
    pub async fn budget(
        &self,
        user_id: i64,
        month: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<BudgetReport> {
        let month = token(month).map(parse_month).transpose()?;
        let period = month_period(month, today)?;
        tracing::debug!(
            user_id,
            month = %period.start().format("%Y-%m"),
            "budget window"
        );

        let (limits, spend) = self
            .bounded("budget", async {
                tokio::try_join!(
                    self.limits(user_id, period.start()),
                    self.spend(user_id, period)
                )
            })
            .await?;

        Ok(assemble_budget(period.start(), limits, spend))
    }
}
