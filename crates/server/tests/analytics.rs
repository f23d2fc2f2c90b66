use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tower::ServiceExt;

use engine::{Engine, MoneyCents, SqlLedgerStore, Transaction};
use server::{
    ServerState,
    types::{
        analytics::{BudgetResponse, CashflowResponse, SummaryResponse},
        health::HealthResponse,
    },
};

async fn app() -> (Router, Arc<Engine<SqlLedgerStore>>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Arc::new(
        Engine::builder()
            .store(SqlLedgerStore::new(db.clone()))
            .build()
            .unwrap(),
    );
    let state = ServerState {
        engine: engine.clone(),
        db: db.clone(),
    };
    (server::router(state), engine, db)
}

async fn record(
    engine: &Engine<SqlLedgerStore>,
    user_id: i64,
    on: &str,
    cents: i64,
    category: Option<&str>,
) {
    let on = NaiveDate::parse_from_str(on, "%Y-%m-%d").unwrap();
    let tx = Transaction::new(
        user_id,
        on,
        MoneyCents::new(cents),
        category.map(str::to_string),
    )
    .unwrap();
    engine.store().record_transaction(&tx).await.unwrap();
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(user) = user {
        request = request.header("x-user-id", user);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn summary_returns_totals_and_breakdown() {
    let (app, engine, _db) = app().await;
    engine.store().create_category("Food").await.unwrap();
    record(&engine, 1, "2024-03-05", -4_000, Some("food")).await;
    record(&engine, 1, "2024-03-10", 200_000, None).await;
    record(&engine, 2, "2024-03-10", 99, None).await;

    let (status, body) = get(
        &app,
        "/analytics/summary?from=2024-03-01&to=2024-03-31",
        Some("1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let summary: SummaryResponse = serde_json::from_value(body).unwrap();
    assert_eq!(summary.period.from, "2024-03-01");
    assert_eq!(summary.period.to, "2024-03-31");
    assert_eq!(summary.totals.income_minor, 200_000);
    assert_eq!(summary.totals.expenses_minor, -4_000);
    assert_eq!(summary.totals.net_minor, 196_000);
    assert_eq!(summary.by_category.len(), 2);
    assert_eq!(summary.by_category[0].category, "Uncategorized");
    assert_eq!(summary.by_category[1].category, "Food");
    assert_eq!(summary.by_category[1].amount_minor, -4_000);
}

#[tokio::test]
async fn cashflow_always_has_twelve_months() {
    let (app, engine, _db) = app().await;
    record(&engine, 1, "2024-03-15", 500, None).await;

    let (status, body) = get(&app, "/analytics/cashflow?year=2024", Some("1")).await;
    assert_eq!(status, StatusCode::OK);

    let cashflow: CashflowResponse = serde_json::from_value(body).unwrap();
    assert_eq!(cashflow.year, 2024);
    assert_eq!(cashflow.months.len(), 12);
    assert_eq!(cashflow.months[2].month, "2024-03");
    assert_eq!(cashflow.months[2].net_minor, 500);
    assert_eq!(cashflow.months[3].net_minor, 0);
}

#[tokio::test]
async fn budget_reports_clamped_rows() {
    let (app, engine, _db) = app().await;
    let food = engine.store().create_category("Food").await.unwrap();
    engine
        .store()
        .set_budget(
            1,
            food.id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            MoneyCents::new(10_000),
            false,
        )
        .await
        .unwrap();
    record(&engine, 1, "2024-03-02", -12_500, Some("Food")).await;

    let (status, body) = get(&app, "/analytics/budget?month=2024-03", Some("1")).await;
    assert_eq!(status, StatusCode::OK);

    let budget: BudgetResponse = serde_json::from_value(body).unwrap();
    assert_eq!(budget.month, "2024-03");
    assert_eq!(budget.items.len(), 1);
    assert_eq!(budget.items[0].category, "Food");
    assert_eq!(budget.items[0].limit_minor, 10_000);
    assert_eq!(budget.items[0].spent_minor, 12_500);
    assert_eq!(budget.items[0].remaining_minor, 0);
    assert_eq!(budget.items[0].over_minor, 2_500);
    assert_eq!(budget.totals.over_minor, 2_500);
}

#[tokio::test]
async fn missing_or_bad_identity_is_unauthorized() {
    let (app, _engine, _db) = app().await;

    let (status, _) = get(&app, "/analytics/summary", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/analytics/cashflow", Some("alice")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_parameters_are_bad_requests() {
    let (app, _engine, _db) = app().await;

    for uri in [
        "/analytics/summary?from=2024-03-10&to=2024-03-01",
        "/analytics/summary?from=yesterday",
        "/analytics/cashflow?year=1969",
        "/analytics/cashflow?year=abcd",
        "/analytics/budget?month=2024-3",
    ] {
        let (status, body) = get(&app, uri, Some("1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn store_failure_is_opaque() {
    let (app, _engine, db) = app().await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE transactions;".to_string(),
    ))
    .await
    .unwrap();

    let (status, body) = get(&app, "/analytics/summary", Some("1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "failed to compute summary");
}

#[tokio::test]
async fn health_endpoints() {
    let (app, _engine, _db) = app().await;

    let (status, body) = get(&app, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "ok");

    let (status, body) = get(&app, "/healthz/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
