//! Production report HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::NewProductionReport;
use crate::AppState;

/// Record a new production report
pub async fn create_production_report(
    State(state): State<AppState>,
    Json(input): Json<NewProductionReport>,
) -> impl IntoResponse {
    let today = chrono::Local::now().date_naive();

    match state.reports.submit(input, today).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}
