use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cardprice_core::catalog::MarketItem;
use cardprice_core::scheduler::{RunLeaseStore, SCHEDULER_LEASE};
use cardprice_market_data::SourceCredentials;
use cardprice_server::{api::app_router, build_state, config::Config, AppState};
use cardprice_storage_sqlite::{db, RunLeaseRepository};
use rust_decimal_macros::dec;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    db_path: String,
    _tmp: TempDir,
}

async fn build_test_app(credentials: SourceCredentials) -> TestApp {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("test.db").to_string_lossy().to_string();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: db_path.clone(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        schedule_interval: None,
        engine_config_path: None,
        credentials,
    };
    let state = build_state(&config).await.unwrap();
    TestApp {
        router: app_router(state.clone(), &config),
        state,
        db_path,
        _tmp: tmp,
    }
}

fn all_credentials() -> SourceCredentials {
    SourceCredentials {
        cardmarket_api_key: Some("cm-key".to_string()),
        pricecharting_token: Some("pc-token".to_string()),
        ebay_app_id: Some("ebay-app".to_string()),
        ..Default::default()
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = build_test_app(SourceCredentials::default()).await;
    let (status, body) = send(&app, Method::GET, "/api/v1/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn manual_ingest_updates_catalog_price() {
    let app = build_test_app(SourceCredentials::default()).await;
    let mut card = MarketItem::new("card-1", "Charizard", "pokemon");
    card.current_price = Some(dec!(45));
    app.state.catalog.upsert_items(vec![card]).await.unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/ingest",
        Some(serde_json::json!({
            "source": "manual",
            "observations": [
                { "marketItemId": "card-1", "price": 50 },
                { "marketItemId": "ghost", "price": 10 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = json(&body);
    assert_eq!(result["source"], "manual");
    assert_eq!(result["itemsProcessed"], 1);
    assert_eq!(result["pricesUpdated"], 1);
    assert_eq!(result["errors"][0], "ghost: unknown market item id");

    let item = app.state.catalog.get_item("card-1").unwrap().unwrap();
    assert_eq!(item.current_price, Some(dec!(50)));
    assert_eq!(item.price_source.as_deref(), Some("manual"));
}

#[tokio::test]
async fn ingest_without_credential_is_a_configuration_error() {
    let app = build_test_app(SourceCredentials::default()).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/ingest",
        Some(serde_json::json!({ "source": "ebay" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json(&body);
    assert_eq!(error["code"], 500);
    assert!(error["message"].as_str().unwrap().contains("CP_EBAY_APP_ID"));
}

#[tokio::test]
async fn unknown_source_is_rejected() {
    let app = build_test_app(SourceCredentials::default()).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/ingest",
        Some(serde_json::json!({ "source": "tcgplayer" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn scheduler_run_is_audited() {
    let app = build_test_app(all_credentials()).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/scheduler/run",
        Some(serde_json::json!({ "mode": "max_throughput", "batchSize": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let summary = json(&body);
    assert_eq!(summary["selected"], 0);

    let (status, body) = send(&app, Method::GET, "/api/v1/scheduler/runs", None).await;
    assert_eq!(status, StatusCode::OK);
    let runs = json(&body);
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["runId"], summary["runId"]);
}

#[tokio::test]
async fn scheduler_run_without_credentials_fails_before_audit() {
    let app = build_test_app(SourceCredentials::default()).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/scheduler/run",
        Some(serde_json::json!({ "mode": "full_sync" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["message"]
        .as_str()
        .unwrap()
        .contains("CP_CARDMARKET_API_KEY"));
    assert!(app.state.audit_log.list_recent(10).unwrap().is_empty());
}

#[tokio::test]
async fn overlapping_scheduler_run_conflicts() {
    let app = build_test_app(all_credentials()).await;
    let (pool, writer) = db::open(&app.db_path).unwrap();
    let leases = RunLeaseRepository::new(pool, writer);
    assert!(leases
        .try_acquire(SCHEDULER_LEASE, "other-run", chrono::Duration::minutes(15))
        .await
        .unwrap());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/scheduler/run",
        Some(serde_json::json!({ "mode": "max_throughput" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["code"], 409);
}

#[tokio::test]
async fn review_queue_limit_is_validated() {
    let app = build_test_app(SourceCredentials::default()).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/review-queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json(&body).as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/api/v1/review-queue?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
