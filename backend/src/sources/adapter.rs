//! Source adapter boundary
//!
//! A source is one named, table-like collection with its own column names.
//! Adapters hand back untyped rows; the normalizer decides what they mean.

use shared::{CanonicalField, FetchFilter, FieldTable, RawRecord};
use thiserror::Error;

/// Failure at the adapter boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source '{table}' is unavailable: {message}")]
    Unavailable { table: String, message: String },

    #[error("row from '{table}' could not be decoded: {message}")]
    Decode { table: String, message: String },

    #[error("unknown source table '{0}'")]
    UnknownTable(String),
}

impl SourceError {
    pub fn unavailable(table: impl Into<String>, message: impl ToString) -> Self {
        SourceError::Unavailable {
            table: table.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(table: impl Into<String>, message: impl ToString) -> Self {
        SourceError::Decode {
            table: table.into(),
            message: message.to_string(),
        }
    }
}

/// Read primitive: ordered rows or a typed error. Zero rows is a success.
#[axum::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, filter: FetchFilter) -> Result<Vec<RawRecord>, SourceError>;
}

/// Append primitive used by the insert path
#[axum::async_trait]
pub trait RecordSink: Send + Sync {
    /// Store one row and return it as the source now holds it
    async fn insert(&self, row: RawRecord) -> Result<RawRecord, SourceError>;
}

/// Physical shape of a table, independent of which entity reads it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub date_column: &'static str,
    pub key_column: &'static str,
    /// Every column some field table maps
    pub columns: Vec<&'static str>,
}

impl TableSpec {
    pub fn of<F: CanonicalField>(table: &FieldTable<F>) -> Self {
        Self {
            name: table.source,
            date_column: table.date_column,
            key_column: table.key_column,
            columns: table.columns.iter().map(|(_, column)| *column).collect(),
        }
    }

    /// Widen with the columns another entity's view of the same table maps
    pub fn merge<F: CanonicalField>(&mut self, table: &FieldTable<F>) {
        for (_, column) in table.columns {
            if !self.columns.contains(column) {
                self.columns.push(column);
            }
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.key_column == column || self.columns.iter().any(|c| *c == column)
    }
}
