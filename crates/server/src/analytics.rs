//! Analytics API endpoints

use api_types::analytics::{
    BudgetItem, BudgetQuery, BudgetResponse, BudgetTotals, CashflowMonth, CashflowQuery,
    CashflowResponse, CategoryAmount, Period, SummaryQuery, SummaryResponse, Totals,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use engine::{BudgetReport, CashflowReport, SummaryReport};

use crate::{ServerError, UserId, server::ServerState};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Handle requests for the income/expense summary of a date window
pub async fn summary(
    Extension(UserId(user_id)): Extension<UserId>,
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let report = state
        .engine
        .summary(user_id, query.from.as_deref(), query.to.as_deref(), today())
        .await
        .map_err(|source| ServerError::Report {
            report: "summary",
            source,
        })?;

    Ok(Json(summary_response(report)))
}

/// Handle requests for the monthly cash flow of a year
pub async fn cashflow(
    Extension(UserId(user_id)): Extension<UserId>,
    State(state): State<ServerState>,
    Query(query): Query<CashflowQuery>,
) -> Result<Json<CashflowResponse>, ServerError> {
    let report = state
        .engine
        .cashflow(user_id, query.year.as_deref(), today())
        .await
        .map_err(|source| ServerError::Report {
            report: "cashflow",
            source,
        })?;

    Ok(Json(cashflow_response(report)))
}

/// Handle requests for budget usage of a month
pub async fn budget(
    Extension(UserId(user_id)): Extension<UserId>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetResponse>, ServerError> {
    let report = state
        .engine
        .budget(user_id, query.month.as_deref(), today())
        .await
        .map_err(|source| ServerError::Report {
            report: "budget",
            source,
        })?;

    Ok(Json(budget_response(report)))
}

fn summary_response(report: SummaryReport) -> SummaryResponse {
    SummaryResponse {
        period: Period {
            from: report.from.to_string(),
            to: report.to.to_string(),
        },
        totals: Totals {
            income_minor: report.totals.income.cents(),
            expenses_minor: report.totals.expenses.cents(),
            net_minor: report.totals.net.cents(),
        },
        by_category: report
            .by_category
            .into_iter()
            .map(|row| CategoryAmount {
                category: row.category,
                amount_minor: row.amount.cents(),
            })
            .collect(),
    }
}

fn cashflow_response(report: CashflowReport) -> CashflowResponse {
    CashflowResponse {
        year: report.year,
        months: report
            .months
            .into_iter()
            .map(|month| CashflowMonth {
                month: month.month,
                income_minor: month.income.cents(),
                expenses_minor: month.expenses.cents(),
                net_minor: month.net.cents(),
            })
            .collect(),
    }
}

fn budget_response(report: BudgetReport) -> BudgetResponse {
    let month = report.month_label();
    BudgetResponse {
        month,
        items: report
            .items
            .into_iter()
            .map(|row| BudgetItem {
                category: row.category,
                limit_minor: row.limit.cents(),
                spent_minor: row.spent.cents(),
                remaining_minor: row.remaining.cents(),
                over_minor: row.over.cents(),
            })
            .collect(),
        totals: BudgetTotals {
            limit_minor: report.totals.limit.cents(),
            spent_minor: report.totals.spent.cents(),
            remaining_minor: report.totals.remaining.cents(),
            over_minor: report.totals.over.cents(),
        },
    }
}
