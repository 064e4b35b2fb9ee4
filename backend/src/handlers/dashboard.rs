//! Dashboard HTTP handlers
//!
//! Every response is a status envelope. A view whose own entity could not be
//! read from any source answers 503; an aggregation failure answers 500.
//! Both carry a retryable error instead of partial metrics.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared::{AttemptOutcome, MetricsResponse, Provenance};

use crate::error::AppError;
use crate::services::{AggregationError, View};
use crate::AppState;

/// Query parameters accepted by every dashboard endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Reference date for projections; defaults to the server's local date
    pub today: Option<NaiveDate>,
}

impl DashboardQuery {
    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Reference date for a request; a malformed query becomes an error envelope
fn reference_date(query: Result<Query<DashboardQuery>, QueryRejection>) -> Result<NaiveDate, Response> {
    match query {
        Ok(Query(query)) => Ok(query.today()),
        Err(rejection) => Err(failure(AppError::Validation {
            field: "today".to_string(),
            message: format!("Invalid 'today' query parameter: {}", rejection.body_text()),
        })),
    }
}

/// Metrics of one view alongside the provenance of what it read
#[derive(Debug, Serialize)]
pub struct ViewMetrics<M> {
    #[serde(flatten)]
    pub metrics: M,
    pub provenance: Vec<Provenance>,
}

fn failure(error: AppError) -> Response {
    let (message, cause) = match &error {
        AppError::Aggregation(e) => (e.message.clone(), e.cause.clone()),
        AppError::SourceUnavailable { entity, message } => (
            format!("No data source for {} is reachable", entity),
            Some(message.clone()),
        ),
        AppError::Validation { message, .. } => (message.clone(), None),
        other => (other.to_string(), None),
    };
    tracing::error!(error = %error, ?cause, "Dashboard request failed");

    (
        error.status_code(),
        Json(MetricsResponse::<()>::error(message, cause)),
    )
        .into_response()
}

fn attempt_errors(provenance: &Provenance) -> String {
    provenance
        .attempts
        .iter()
        .filter_map(|attempt| match &attempt.outcome {
            AttemptOutcome::Error { message } => Some(message.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn view_response<M: Serialize>(result: Result<View<M>, AggregationError>) -> Response {
    match result {
        Ok(view) if view.unavailable() => {
            let (entity, message) = match view.provenance.first() {
                Some(p) => (p.entity.to_string(), attempt_errors(p)),
                None => ("view".to_string(), String::new()),
            };
            failure(AppError::SourceUnavailable { entity, message })
        }
        Ok(view) => (
            StatusCode::OK,
            Json(MetricsResponse::ready(ViewMetrics {
                metrics: view.metrics,
                provenance: view.provenance,
            })),
        )
            .into_response(),
        Err(e) => failure(e.into()),
    }
}

/// Full dashboard. Unreachable entities show as empty views here; only an
/// aggregation failure turns the whole response into an error.
pub async fn get_dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    let today = match reference_date(query) {
        Ok(today) => today,
        Err(response) => return response,
    };
    match state.metrics.refresh(today).await {
        Ok(metrics) => (StatusCode::OK, Json(MetricsResponse::ready(metrics))).into_response(),
        Err(e) => failure(e.into()),
    }
}

pub async fn get_production_metrics(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    match reference_date(query) {
        Ok(today) => view_response(state.metrics.production(today).await),
        Err(response) => response,
    }
}

pub async fn get_quality_metrics(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    match reference_date(query) {
        Ok(today) => view_response(state.metrics.quality(today).await),
        Err(response) => response,
    }
}

pub async fn get_fattening_metrics(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    match reference_date(query) {
        Ok(today) => view_response(state.metrics.fattening(today).await),
        Err(response) => response,
    }
}

pub async fn get_sales_metrics(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    match reference_date(query) {
        Ok(today) => view_response(state.metrics.sales(today).await),
        Err(response) => response,
    }
}

pub async fn get_staffing_metrics(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    match reference_date(query) {
        Ok(today) => view_response(state.metrics.staffing(today).await),
        Err(response) => response,
    }
}
