use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, UserId, router, run_with_listener};

mod analytics;
mod health;
mod server;

pub mod types {
    pub mod analytics {
        pub use api_types::analytics::{
            BudgetItem, BudgetQuery, BudgetResponse, BudgetTotals, CashflowMonth, CashflowQuery,
            CashflowResponse, CategoryAmount, Period, SummaryQuery, SummaryResponse, Totals,
        };
    }

    pub mod health {
        pub use api_types::health::HealthResponse;
    }
}

pub enum ServerError {
    /// An engine error raised while computing the named report.
    Report {
        report: &'static str,
        source: EngineError,
    },
    Unauthorized,
}

/// Analytics only read, so anything that is not a bad request is a failure
/// on our side.
fn status_for_engine_error(err: &EngineError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Only validation messages reach the caller; everything else is logged.
fn message_for_engine_error(err: EngineError, report: &str) -> String {
    if err.is_validation() {
        return err.to_string();
    }
    if err.is_store_failure() {
        tracing::error!(report, "store failure: {err}");
    } else {
        tracing::error!(report, "unexpected engine error: {err}");
    }
    format!("failed to compute {report}")
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Report { report, source } => (
                status_for_engine_error(&source),
                message_for_engine_error(source, report),
            ),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid x-user-id header".to_string(),
            ),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
