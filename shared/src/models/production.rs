//! Production models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Quality score assumed when a production source carries none
pub const DEFAULT_QUALITY_SCORE: f64 = 85.0;

/// A production batch in canonical form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionRecord {
    /// Primary key of the source row, passed through untouched
    pub source_key: Option<String>,
    pub product_type: String,
    pub raw_material_used: f64,
    pub finished_amount: f64,
    /// 0-100, supplied by the source or derived from the amounts
    pub efficiency_percent: f64,
    /// 0-100
    pub quality_score: f64,
    pub production_date: NaiveDate,
}
