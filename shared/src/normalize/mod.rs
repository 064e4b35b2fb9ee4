//! Normalization of raw source rows into canonical records
//!
//! Each source table has an explicit [`FieldTable`] naming which of its
//! columns feeds which canonical field. There is no guessing at runtime: a
//! table that is not listed here cannot be normalized.

mod fattening;
mod production;
mod quality;
mod reader;
mod sales;
mod staffing;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::Entity;

pub use fattening::*;
pub use production::*;
pub use quality::*;
pub use reader::{value_as_date, value_as_decimal, value_as_f64, value_as_text, RowReader};
pub use sales::*;
pub use staffing::*;

/// Untyped key/value row as emitted by a source adapter
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Reasons a raw row cannot become a canonical record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' has an invalid value: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("field '{field}' must be non-negative")]
    Negative { field: &'static str },
}

/// Inputs normalization needs besides the row itself
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub today: NaiveDate,
}

/// A canonical field of one entity
pub trait CanonicalField: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    fn name(self) -> &'static str;
}

/// Column mapping for one source table
#[derive(Debug)]
pub struct FieldTable<F: 'static> {
    /// Table name as known to the backend
    pub source: &'static str,
    /// Column the adapter orders by
    pub date_column: &'static str,
    /// Primary key column, passed through as `source_key`
    pub key_column: &'static str,
    pub columns: &'static [(F, &'static str)],
}

impl<F: CanonicalField> FieldTable<F> {
    /// Source column mapped to `field`, if the table has one
    pub fn column(&self, field: F) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, column)| *column)
    }

    pub fn maps(&self, field: F) -> bool {
        self.column(field).is_some()
    }

    pub fn reader<'a>(&'a self, raw: &'a RawRecord) -> RowReader<'a, F> {
        RowReader::new(self, raw)
    }
}

/// A canonical record type that can be built from any of its known tables
pub trait Canonical: Sized + Send + 'static {
    type Field: CanonicalField;

    const ENTITY: Entity;

    /// Every table this entity can be read from
    fn tables() -> &'static [&'static FieldTable<Self::Field>];

    fn table(source: &str) -> Option<&'static FieldTable<Self::Field>> {
        Self::tables().iter().copied().find(|t| t.source == source)
    }

    fn normalize(
        table: &FieldTable<Self::Field>,
        raw: &RawRecord,
        ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError>;
}

/// Normalize a batch, keeping the rows that map and the errors of those that do not
pub fn normalize_rows<T: Canonical>(
    table: &FieldTable<T::Field>,
    rows: &[RawRecord],
    ctx: &NormalizeContext,
) -> (Vec<T>, Vec<NormalizeError>) {
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    for row in rows {
        match T::normalize(table, row, ctx) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
    }
    (records, errors)
}

#[cfg(test)]
pub(crate) fn raw(value: serde_json::Value) -> RawRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
