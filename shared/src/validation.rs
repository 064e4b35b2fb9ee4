//! Validation utilities for canonical records
//!
//! Normalization already enforces what it can; these checks cover the
//! invariants a record must satisfy before it is written back through the
//! insert path or trusted by a client.

use crate::models::{FatteningRecord, ProductionRecord};
use crate::projection::{MAX_DAILY_GAIN, MIN_DAILY_GAIN};

// ============================================================================
// Production
// ============================================================================

/// Product type must be present after trimming
pub fn validate_product_type(product_type: &str) -> Result<(), &'static str> {
    if product_type.trim().is_empty() {
        return Err("Product type is required");
    }
    Ok(())
}

/// Raw material and finished amounts are non-negative and finite
pub fn validate_amount(amount: f64) -> Result<(), &'static str> {
    if !amount.is_finite() {
        return Err("Amount must be a number");
    }
    if amount < 0.0 {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Percentages (efficiency, quality) lie within 0-100
pub fn validate_percent(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

pub fn validate_production_record(record: &ProductionRecord) -> Result<(), &'static str> {
    validate_product_type(&record.product_type)?;
    validate_amount(record.raw_material_used)?;
    validate_amount(record.finished_amount)?;
    validate_percent(record.efficiency_percent)?;
    validate_percent(record.quality_score)?;
    Ok(())
}

// ============================================================================
// Fattening
// ============================================================================

/// Live weights are strictly positive
pub fn validate_weight(weight_kg: f64) -> Result<(), &'static str> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err("Weight must be greater than zero");
    }
    Ok(())
}

pub fn is_gain_in_band(gain: f64) -> bool {
    (MIN_DAILY_GAIN..=MAX_DAILY_GAIN).contains(&gain)
}

/// Present weights are positive and the gain is within the clamp band.
/// Being above target weight is allowed.
pub fn validate_fattening_record(record: &FatteningRecord) -> Result<(), &'static str> {
    for weight in [record.entry_weight, record.current_weight, record.target_weight]
        .into_iter()
        .flatten()
    {
        validate_weight(weight)?;
    }
    if !is_gain_in_band(record.daily_gain) {
        return Err("Daily gain outside the accepted band");
    }
    Ok(())
}
