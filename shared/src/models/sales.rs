//! Sales models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sale or export order line in canonical form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    pub source_key: Option<String>,
    pub product: String,
    pub customer: Option<String>,
    pub quantity: f64,
    pub unit_price: Decimal,
    /// Supplied by the source or `quantity × unit_price`
    pub total_amount: Decimal,
    pub sale_date: NaiveDate,
}
