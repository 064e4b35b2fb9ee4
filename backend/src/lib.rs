//! Farm Operations Metrics Platform - Backend
//!
//! Resolves dashboard entities across fallback chains of data sources,
//! normalizes them and serves the derived metrics over HTTP.

use axum::{routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod sources;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{MetricsAggregator, NotificationSink, ProductionReportService};
use sources::SourceRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present when sources are backed by PostgreSQL
    pub db: Option<PgPool>,
    pub config: Arc<Config>,
    pub metrics: MetricsAggregator,
    pub reports: ProductionReportService,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: SourceRegistry,
        notifications: Arc<dyn NotificationSink>,
        db: Option<PgPool>,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            db,
            metrics: MetricsAggregator::new(Arc::clone(&registry), config.metrics.fetch_limit),
            reports: ProductionReportService::new(registry.report_sink(), notifications),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Operations Metrics Platform API v1.0"
}
