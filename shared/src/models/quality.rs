//! Quality models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a quality score was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityOrigin {
    /// Share of passed checks on a checklist row
    Checklist,
    /// Score column read directly from a reception or production row
    DirectScore,
}

/// A quality observation in canonical form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityRecord {
    pub source_key: Option<String>,
    pub date: NaiveDate,
    /// 0-100
    pub average_quality: f64,
    pub volume: f64,
    pub origin: QualityOrigin,
}
