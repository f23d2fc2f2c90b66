//! Read-only analytics over a personal-finance ledger.
//!
//! The [`Engine`] turns raw query tokens into a validated [`Period`], fans the
//! grouped queries of a report out to a [`LedgerStore`] under a single
//! timeout, and assembles the results into [`SummaryReport`],
//! [`CashflowReport`] or [`BudgetReport`].

pub use aggregation::{
    BudgetLimit, CategoryAmount, CategorySpend, MonthFlow, Totals, merge_category_amounts,
    merge_month_flows, merge_spend,
};
pub use budgets::{BudgetDefinition, carry_forward};
pub use categories::{Category, UNCATEGORIZED_NAME};
pub use category_aliases::CategoryAlias;
pub use category_resolver::{CategoryResolver, UNCATEGORIZED_FALLBACK_ID};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{DEFAULT_QUERY_TIMEOUT, Engine, EngineBuilder};
pub use period::{
    MAX_YEAR, MIN_YEAR, Period, calendar_year, month_period, parse_date, parse_month, parse_year,
    resolve_period, year_period,
};
pub use reports::{
    BudgetReport, BudgetRow, BudgetTotals, CashflowMonth, CashflowReport, SummaryReport,
    assemble_budget, assemble_cashflow, assemble_summary,
};
pub use store::{BatchOutcome, LedgerStore, MemoryLedger, SqlLedgerStore};
pub use transactions::Transaction;

mod aggregation;
mod budgets;
mod categories;
mod category_aliases;
mod category_resolver;
mod error;
mod money;
mod ops;
mod period;
mod reports;
mod store;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
