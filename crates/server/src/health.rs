use std::time::Duration;

use api_types::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode};

use crate::server::ServerState;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(1);

fn status(status: &str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: status.to_string(),
    })
}

pub async fn healthz() -> Json<HealthResponse> {
    status("ok")
}

/// 503 when the database does not answer a ping within a second.
pub async fn healthz_db(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    match tokio::time::timeout(DB_PING_TIMEOUT, state.db.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, status("ok")),
        Ok(Err(err)) => {
            tracing::warn!("database ping failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, status("degraded"))
        }
        Err(_) => {
            tracing::warn!("database ping timed out");
            (StatusCode::SERVICE_UNAVAILABLE, status("degraded"))
        }
    }
}
