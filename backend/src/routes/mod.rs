//! Route definitions for the Farm Operations Metrics Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Dashboard views (read-only, recomputed on every request)
        .nest("/dashboard", dashboard_routes())
        // Production report insert path
        .route(
            "/production-reports",
            post(handlers::create_production_report),
        )
}

/// Dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/production", get(handlers::get_production_metrics))
        .route("/quality", get(handlers::get_quality_metrics))
        .route("/fattening", get(handlers::get_fattening_metrics))
        .route("/sales", get(handlers::get_sales_metrics))
        .route("/staffing", get(handlers::get_staffing_metrics))
}
