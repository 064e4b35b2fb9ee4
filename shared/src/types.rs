//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Row limit applied when a caller does not ask for one
pub const DEFAULT_FETCH_LIMIT: u32 = 10;

/// Query shape accepted by every source adapter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchFilter {
    pub order_by_date_descending: bool,
    pub limit: u32,
}

impl FetchFilter {
    pub fn most_recent(limit: u32) -> Self {
        Self {
            order_by_date_descending: true,
            limit,
        }
    }
}

impl Default for FetchFilter {
    fn default() -> Self {
        Self::most_recent(DEFAULT_FETCH_LIMIT)
    }
}

/// Logical entities the dashboard reads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Production,
    Quality,
    Sales,
    Fattening,
    Staffing,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Production,
        Entity::Quality,
        Entity::Sales,
        Entity::Fattening,
        Entity::Staffing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Production => "production",
            Entity::Quality => "quality",
            Entity::Sales => "sales",
            Entity::Fattening => "fattening",
            Entity::Staffing => "staffing",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing one candidate in a fallback chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Rows { count: usize },
    Empty,
    Error { message: String },
}

/// One probed candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceAttempt {
    pub source: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Which source actually supplied an entity's records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub entity: Entity,
    /// `None` when no candidate produced rows
    pub selected_source: Option<String>,
    pub row_count: usize,
    /// Rows the normalizer could not map to the canonical shape
    pub skipped_rows: usize,
    pub attempts: Vec<SourceAttempt>,
}

impl Provenance {
    /// True when every candidate failed with an error (as opposed to being empty)
    pub fn all_failed(&self) -> bool {
        !self.attempts.is_empty()
            && self
                .attempts
                .iter()
                .all(|a| matches!(a.outcome, AttemptOutcome::Error { .. }))
    }
}

/// View status reported alongside metrics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricsStatus {
    #[default]
    Loading,
    Ready,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(source: &str, outcome: AttemptOutcome) -> SourceAttempt {
        SourceAttempt {
            source: source.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_default_filter_is_ten_most_recent() {
        let filter = FetchFilter::default();
        assert!(filter.order_by_date_descending);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_all_failed_requires_only_errors() {
        let mut provenance = Provenance {
            entity: Entity::Production,
            selected_source: None,
            row_count: 0,
            skipped_rows: 0,
            attempts: vec![
                attempt("production_reports", AttemptOutcome::Error { message: "down".into() }),
                attempt("cheese_production", AttemptOutcome::Empty),
            ],
        };
        assert!(!provenance.all_failed());

        provenance.attempts[1].outcome = AttemptOutcome::Error { message: "down".into() };
        assert!(provenance.all_failed());

        provenance.attempts.clear();
        assert!(!provenance.all_failed());
    }

    #[test]
    fn test_attempt_serializes_flat() {
        let json = serde_json::to_value(attempt("sales", AttemptOutcome::Rows { count: 3 })).unwrap();
        assert_eq!(json["source"], "sales");
        assert_eq!(json["outcome"], "rows");
        assert_eq!(json["count"], 3);
    }
}
