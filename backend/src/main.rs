//! Farm Operations Metrics Platform - Backend Server
//!
//! Serves reconciled production, quality, fattening, sales and staffing
//! metrics for the operations dashboard.

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farm_metrics::{
    create_app, services::PgNotificationSink, sources::SourceRegistry, AppError, AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farm_metrics_server=debug,farm_metrics=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm Operations Metrics Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Build source chains; an unknown table name stops startup
    let registry = SourceRegistry::postgres(db_pool.clone(), &config.metrics.sources)
        .map_err(|e| AppError::Configuration(e.to_string()))?;
    for entity in shared::Entity::ALL {
        tracing::info!(%entity, chain = ?registry.source_chain(entity), "Source chain");
    }

    // Create application state
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let notifications = Arc::new(PgNotificationSink::new(db_pool.clone()));
    let state = AppState::new(config, registry, notifications, Some(db_pool));

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
