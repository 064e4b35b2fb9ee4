//! Cattle fattening models

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// An animal in the fattening program, with its projections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FatteningRecord {
    pub source_key: Option<String>,
    /// Ear tag or cattle id; falls back to the source key
    pub cattle_id: String,
    pub entry_date: Option<NaiveDate>,
    pub entry_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub target_weight: Option<f64>,
    /// kg/day, always within the clamp band
    pub daily_gain: f64,
    pub estimated_completion: CompletionEstimate,
}

/// Projected date an animal reaches its target weight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum CompletionEstimate {
    /// Current weight already at or above target
    ReadyNow,
    /// Inputs missing or gain not positive
    NotAvailable,
    Projected(NaiveDate),
}

impl CompletionEstimate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CompletionEstimate::Projected(date) => Some(*date),
            _ => None,
        }
    }

    /// Days between `today` and the projected date; zero when ready now
    pub fn days_from(&self, today: NaiveDate) -> Option<i64> {
        match self {
            CompletionEstimate::ReadyNow => Some(0),
            CompletionEstimate::NotAvailable => None,
            CompletionEstimate::Projected(date) => Some((*date - today).num_days()),
        }
    }

    /// `today + days`, or `NotAvailable` when the date cannot be represented
    pub fn projected_in(today: NaiveDate, days: u64) -> Self {
        today
            .checked_add_days(Days::new(days))
            .map_or(CompletionEstimate::NotAvailable, CompletionEstimate::Projected)
    }
}

impl std::fmt::Display for CompletionEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionEstimate::ReadyNow => write!(f, "Ready now"),
            CompletionEstimate::NotAvailable => write!(f, "Not available"),
            CompletionEstimate::Projected(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}
