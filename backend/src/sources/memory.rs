//! In-memory table source
//!
//! Holds rows behind an async lock. Used by tests and local demos, and able
//! to simulate an outage so fallback behavior can be exercised.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

use serde_json::Value;
use tokio::sync::RwLock;

use shared::{value_as_date, FetchFilter, RawRecord};

use super::adapter::{RecordSink, SourceAdapter, SourceError, TableSpec};

pub struct MemorySource {
    spec: TableSpec,
    rows: RwLock<Vec<RawRecord>>,
    unavailable: AtomicBool,
    next_key: AtomicU64,
}

impl MemorySource {
    pub fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            rows: RwLock::new(Vec::new()),
            unavailable: AtomicBool::new(false),
            next_key: AtomicU64::new(1),
        }
    }

    /// Make every fetch and insert fail until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Replace the stored rows
    pub async fn seed(&self, rows: Vec<RawRecord>) {
        let mut stored = self.rows.write().await;
        stored.clear();
        for row in rows {
            stored.push(self.with_key(row));
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(SourceError::unavailable(self.spec.name, "simulated outage"));
        }
        Ok(())
    }

    fn with_key(&self, mut row: RawRecord) -> RawRecord {
        if !row.contains_key(self.spec.key_column) {
            let key = self.next_key.fetch_add(1, AtomicOrdering::SeqCst);
            row.insert(self.spec.key_column.to_string(), Value::from(key));
        }
        row
    }

    fn row_date(&self, row: &RawRecord) -> Option<chrono::NaiveDate> {
        row.get(self.spec.date_column).and_then(value_as_date)
    }
}

#[axum::async_trait]
impl SourceAdapter for MemorySource {
    fn name(&self) -> &str {
        self.spec.name
    }

    async fn fetch(&self, filter: FetchFilter) -> Result<Vec<RawRecord>, SourceError> {
        self.check_available()?;

        let mut rows = self.rows.read().await.clone();
        // Stable sort keeps insertion order among equal dates; undated rows last
        rows.sort_by(|a, b| match (self.row_date(a), self.row_date(b)) {
            (Some(a), Some(b)) if filter.order_by_date_descending => b.cmp(&a),
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        rows.truncate(filter.limit as usize);
        Ok(rows)
    }
}

#[axum::async_trait]
impl RecordSink for MemorySource {
    async fn insert(&self, row: RawRecord) -> Result<RawRecord, SourceError> {
        self.check_available()?;

        let unknown = row.keys().find(|column| !self.spec.has_column(column));
        if let Some(column) = unknown {
            return Err(SourceError::decode(
                self.spec.name,
                format!("column '{}' does not exist", column),
            ));
        }

        let row = self.with_key(row);
        self.rows.write().await.push(row.clone());
        Ok(row)
    }
}
