//! HTTP API tests
//!
//! Drives the router with in-memory sources:
//! - Status envelopes for ready, unavailable and invalid requests
//! - Insert then read through the public endpoints

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use farm_metrics::config::{DatabaseConfig, MetricsConfig, ServerConfig, SourceChains};
use farm_metrics::services::MemoryNotificationSink;
use farm_metrics::sources::{MemoryTables, SourceRegistry};
use farm_metrics::{create_app, AppState, Config};

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        metrics: MetricsConfig::default(),
    }
}

fn app() -> (Router, MemoryTables) {
    let (registry, tables) = SourceRegistry::in_memory(&SourceChains::default()).unwrap();
    let state = AppState::new(
        test_config(),
        registry,
        Arc::new(MemoryNotificationSink::new()),
        None,
    );
    (create_app(state), tables)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "in_memory");
}

#[tokio::test]
async fn test_empty_dashboard_is_ready() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/v1/dashboard?today=2026-06-15")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["metrics"]["generated_on"], "2026-06-15");
    assert_eq!(body["metrics"]["production"]["report_count"], 0);
    assert_eq!(body["metrics"]["provenance"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_view_with_every_source_down_is_503_envelope() {
    let (app, tables) = app();
    for table in ["cattle_fattening", "livestock_weighings"] {
        tables.get(table).unwrap().set_unavailable(true);
    }

    let (status, body) = send(&app, get("/api/v1/dashboard/fattening")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["retryable"], true);
    assert!(body["error"]["cause"].as_str().unwrap().contains("simulated outage"));
    assert!(body.get("metrics").is_none());

    // The combined dashboard still answers
    let (status, body) = send(&app, get("/api/v1/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["fattening"]["head_count"], 0);
}

#[tokio::test]
async fn test_post_report_then_read_view() {
    let (app, _) = app();
    let (status, created) = send(
        &app,
        post_json(
            "/api/v1/production-reports",
            json!({
                "product_type": "Cheddar",
                "raw_material_used": 100.0,
                "finished_product": 80.0,
                "production_date": "2026-06-14"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["product_type"], "Cheddar");
    assert_eq!(created["efficiency_percent"], 80.0);

    let (status, body) = send(&app, get("/api/v1/dashboard/production?today=2026-06-15")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["metrics"]["report_count"], 1);
    assert_eq!(body["metrics"]["reports_this_week"], 1);
    assert_eq!(body["metrics"]["products"][0]["max_efficiency_percent"], 80.0);
    assert_eq!(body["metrics"]["provenance"][0]["selected_source"], "production_reports");
}

#[tokio::test]
async fn test_invalid_report_is_400_with_field() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/production-reports",
            json!({
                "product_type": "Cheddar",
                "raw_material_used": 100.0,
                "finished_product": 80.0,
                "quality_score": 120.0,
                "production_date": "2026-06-14"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "quality_score");
}

#[tokio::test]
async fn test_sales_view_reads_legacy_export_table() {
    let (app, tables) = app();
    let row = json!({
        "coffee_grade": "Specialty",
        "quantity_kg": 100,
        "price_per_kg": "12.00",
        "shipment_date": "2026-06-03"
    });
    let Value::Object(row) = row else { unreachable!() };
    tables.get("export_orders").unwrap().seed(vec![row]).await;

    let (status, body) = send(&app, get("/api/v1/dashboard/sales")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["provenance"][0]["selected_source"], "export_orders");
    assert_eq!(body["metrics"]["products"][0]["product"], "Specialty");
}

#[tokio::test]
async fn test_malformed_today_is_400_envelope() {
    let (app, _) = app();

    for uri in ["/api/v1/dashboard?today=15-06-2026", "/api/v1/dashboard/sales?today=soon"] {
        let (status, body) = send(&app, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["retryable"], true);
        assert!(body["error"]["message"].as_str().unwrap().contains("today"));
        assert!(body.get("metrics").is_none());
    }
}
