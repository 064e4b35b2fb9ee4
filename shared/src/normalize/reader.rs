//! Typed access to a raw row through a field table

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{CanonicalField, FieldTable, NormalizeError, RawRecord};

/// Reads canonical fields out of one raw row
pub struct RowReader<'a, F: 'static> {
    table: &'a FieldTable<F>,
    raw: &'a RawRecord,
}

impl<'a, F: CanonicalField> RowReader<'a, F> {
    pub fn new(table: &'a FieldTable<F>, raw: &'a RawRecord) -> Self {
        Self { table, raw }
    }

    /// Raw value for `field`; JSON null counts as absent
    pub fn value(&self, field: F) -> Option<&'a Value> {
        let column = self.table.column(field)?;
        self.raw.get(column).filter(|v| !v.is_null())
    }

    /// Primary key of the row, rendered as text
    pub fn source_key(&self) -> Option<String> {
        self.raw
            .get(self.table.key_column)
            .and_then(value_as_text)
    }

    pub fn text(&self, field: F) -> Option<String> {
        self.value(field).and_then(value_as_text)
    }

    pub fn required_text(&self, field: F) -> Result<String, NormalizeError> {
        self.text(field)
            .ok_or(NormalizeError::MissingField { field: field.name() })
    }

    /// Present values must parse; absent is `Ok(None)`
    pub fn number(&self, field: F) -> Result<Option<f64>, NormalizeError> {
        match self.value(field) {
            None => Ok(None),
            Some(v) => value_as_f64(v)
                .map(Some)
                .ok_or_else(|| invalid(field, v)),
        }
    }

    /// Unparseable values are treated as absent
    pub fn lenient_number(&self, field: F) -> Option<f64> {
        self.value(field).and_then(value_as_f64)
    }

    /// Absent is zero; negative is rejected
    pub fn non_negative(&self, field: F) -> Result<f64, NormalizeError> {
        let value = self.number(field)?.unwrap_or(0.0);
        if value < 0.0 {
            return Err(NormalizeError::Negative { field: field.name() });
        }
        Ok(value)
    }

    pub fn decimal(&self, field: F) -> Result<Option<Decimal>, NormalizeError> {
        match self.value(field) {
            None => Ok(None),
            Some(v) => value_as_decimal(v)
                .map(Some)
                .ok_or_else(|| invalid(field, v)),
        }
    }

    pub fn date(&self, field: F) -> Result<Option<NaiveDate>, NormalizeError> {
        match self.value(field) {
            None => Ok(None),
            Some(v) => value_as_date(v)
                .map(Some)
                .ok_or_else(|| invalid(field, v)),
        }
    }

    pub fn required_date(&self, field: F) -> Result<NaiveDate, NormalizeError> {
        self.date(field)?
            .ok_or(NormalizeError::MissingField { field: field.name() })
    }

    pub fn lenient_date(&self, field: F) -> Option<NaiveDate> {
        self.value(field).and_then(value_as_date)
    }
}

fn invalid<F: CanonicalField>(field: F, value: &Value) -> NormalizeError {
    NormalizeError::InvalidValue {
        field: field.name(),
        value: value.to_string(),
    }
}

/// Non-empty trimmed text; numbers are rendered
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON numbers and numeric strings
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn value_as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// `YYYY-MM-DD`, or any timestamp starting with one
pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
