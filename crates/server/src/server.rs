use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{ServerError, analytics, health};
use engine::{Engine, SqlLedgerStore};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine<SqlLedgerStore>>,
    pub db: DatabaseConnection,
}

/// Caller identity, inserted into request extensions by [`identify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserId(pub i64);

/// `TypedHeader` for the caller identity
///
/// Authentication happens upstream; the gateway forwards the authenticated
/// user as a numeric "x-user-id" entry in the header.
#[derive(Debug)]
struct UserIdHeader(i64);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(axum::http::HeaderValue::from(self.0)));
    }
}

async fn identify(
    user_header: Result<TypedHeader<UserIdHeader>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(UserIdHeader(user_id))) = user_header else {
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(UserId(user_id));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let analytics = Router::new()
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/cashflow", get(analytics::cashflow))
        .route("/analytics/budget", get(analytics::budget))
        .route_layer(middleware::from_fn(identify));

    Router::new()
        .merge(analytics)
        .route("/healthz", get(health::healthz))
        .route("/healthz/db", get(health::healthz_db))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine<SqlLedgerStore>,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
