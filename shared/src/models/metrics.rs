//! Dashboard metrics models
//!
//! These are rebuilt from scratch on every load and never written back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FatteningRecord;
use crate::types::{MetricsStatus, Provenance};

/// Production totals for one product type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub product_type: String,
    pub batch_count: usize,
    pub total_raw_material: f64,
    pub total_finished: f64,
    /// Highest efficiency seen across the group's batches
    pub max_efficiency_percent: f64,
}

/// One point of the quality time series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityPoint {
    pub date: NaiveDate,
    pub average_quality: f64,
    pub volume: f64,
}

/// Production view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProductionMetrics {
    pub products: Vec<ProductSummary>,
    pub total_finished: f64,
    /// Row count of the resolved production set
    pub report_count: usize,
    /// Resolved reports dated within the seven days ending today
    pub reports_this_week: usize,
    pub growth_percent: f64,
}

/// Quality view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QualityMetrics {
    pub series: Vec<QualityPoint>,
    pub average_quality_score: f64,
}

/// Population-level fattening figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FatteningSummary {
    pub head_count: usize,
    pub average_daily_gain: f64,
    pub average_current_weight: f64,
    pub average_target_weight: f64,
    pub ready_now: usize,
    pub without_projection: usize,
    /// Mean over animals with a projected date; `None` when there are none
    pub average_days_to_completion: Option<f64>,
    pub animals: Vec<FatteningRecord>,
}

/// Sales per product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSales {
    pub product: String,
    pub quantity: f64,
    pub revenue: Decimal,
}

/// Sales view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_quantity: f64,
    pub products: Vec<ProductSales>,
    pub growth_percent: f64,
}

/// Attendance per department
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentAttendance {
    pub department: String,
    pub scheduled: u32,
    pub present: u32,
    pub attendance_percent: f64,
}

/// Staffing view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StaffingSummary {
    pub departments: Vec<DepartmentAttendance>,
    pub overall_attendance_percent: f64,
}

/// Everything the dashboard renders from one refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub generated_on: NaiveDate,
    pub production: ProductionMetrics,
    pub quality: QualityMetrics,
    pub fattening: FatteningSummary,
    pub sales: SalesSummary,
    pub staffing: StaffingSummary,
    pub provenance: Vec<Provenance>,
}

/// Error detail carried by an error envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// The view should offer a manual retry
    pub retryable: bool,
}

/// Status envelope handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsResponse<T> {
    pub status: MetricsStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MetricsError>,
}

impl<T> MetricsResponse<T> {
    pub fn loading() -> Self {
        Self {
            status: MetricsStatus::Loading,
            metrics: None,
            error: None,
        }
    }

    pub fn ready(metrics: T) -> Self {
        Self {
            status: MetricsStatus::Ready,
            metrics: Some(metrics),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, cause: Option<String>) -> Self {
        Self {
            status: MetricsStatus::Error,
            metrics: None,
            error: Some(MetricsError {
                message: message.into(),
                cause,
                retryable: true,
            }),
        }
    }
}
