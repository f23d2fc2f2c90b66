//! JSON bodies exchanged with the HTTP API.
//!
//! Amounts travel as integer minor units (`*_minor`, e.g. cents) so no
//! precision is lost between the ledger and the client.

use serde::{Deserialize, Serialize};

pub mod analytics {
    use super::*;

    /// Query string of `GET /analytics/summary`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        /// `YYYY-MM-DD`, inclusive.
        pub from: Option<String>,
        /// `YYYY-MM-DD`, inclusive.
        pub to: Option<String>,
    }

    /// Query string of `GET /analytics/cashflow`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct CashflowQuery {
        /// `YYYY`
        pub year: Option<String>,
    }

    /// Query string of `GET /analytics/budget`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BudgetQuery {
        /// `YYYY-MM`
        pub month: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Period {
        pub from: String,
        pub to: String,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Totals {
        pub income_minor: i64,
        /// Zero or negative.
        pub expenses_minor: i64,
        pub net_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryAmount {
        pub category: String,
        pub amount_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SummaryResponse {
        pub period: Period,
        pub totals: Totals,
        pub by_category: Vec<CategoryAmount>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CashflowMonth {
        /// `YYYY-MM`
        pub month: String,
        pub income_minor: i64,
        pub expenses_minor: i64,
        pub net_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CashflowResponse {
        pub year: i32,
        pub months: Vec<CashflowMonth>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BudgetItem {
        pub category: String,
        pub limit_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub over_minor: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BudgetTotals {
        pub limit_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub over_minor: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BudgetResponse {
        /// `YYYY-MM`
        pub month: String,
        pub items: Vec<BudgetItem>,
        pub totals: BudgetTotals,
    }
}

pub mod health {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct HealthResponse {
        /// `ok` or `degraded`.
        pub status: String,
    }
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
