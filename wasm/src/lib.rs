//! WebAssembly module for the Farm Operations Metrics Platform
//!
//! Provides client-side computation for dashboard widgets:
//! - Daily gain and completion projections for fattening cards
//! - Efficiency and checklist percentages
//! - Period-over-period growth for chart annotations
//! - Normalizing a raw row before it is previewed

use chrono::NaiveDate;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use shared::{
    Canonical, Entity, FatteningRecord, NormalizeContext, ProductionRecord, QualityRecord,
    RawRecord, SalesRecord, StaffingRecord, DEFAULT_DAILY_GAIN,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn require_date(value: &str) -> Result<NaiveDate, JsValue> {
    parse_date(value).ok_or_else(|| JsValue::from_str(&format!("Invalid date: {}", value)))
}

/// Today's local date from the browser clock, as `YYYY-MM-DD`
#[wasm_bindgen]
pub fn today_iso() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

/// Whole days an animal has been in the program
#[wasm_bindgen]
pub fn days_in_program(entry_date: &str, today: &str) -> Result<i32, JsValue> {
    let days = shared::days_in_program(require_date(entry_date)?, require_date(today)?);
    i32::try_from(days).map_err(|_| JsValue::from_str("Date range too large"))
}

/// Clamped kg/day gain; unparseable dates give the default gain
#[wasm_bindgen]
pub fn daily_gain(entry_weight: f64, current_weight: f64, entry_date: &str, today: &str) -> f64 {
    match (parse_date(entry_date), parse_date(today)) {
        (Some(entered), Some(today)) => {
            shared::daily_gain(entry_weight, current_weight, entered, today)
        }
        _ => {
            warn("daily_gain: unparseable date, using default gain");
            DEFAULT_DAILY_GAIN
        }
    }
}

/// Completion estimate as JSON: `{"status": "ready_now" | "not_available" | "projected", "date"?}`
#[wasm_bindgen]
pub fn estimated_completion(
    current_weight: f64,
    target_weight: f64,
    daily_gain: f64,
    today: &str,
) -> Result<String, JsValue> {
    let estimate =
        shared::estimated_completion(current_weight, target_weight, daily_gain, require_date(today)?);
    serde_json::to_string(&estimate).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whole-number efficiency within 0-100
#[wasm_bindgen]
pub fn efficiency_percent(finished_amount: f64, raw_material_used: f64) -> f64 {
    shared::efficiency_percent(finished_amount, raw_material_used)
}

/// Whole-number share of passed checks
#[wasm_bindgen]
pub fn checklist_score(passed: u32, total: u32) -> f64 {
    shared::checklist_score(passed as usize, total as usize)
}

#[derive(Deserialize)]
struct SeriesPoint {
    date: NaiveDate,
    value: f64,
}

/// Growth of the later half of `[{"date": "YYYY-MM-DD", "value": n}, ...]`
#[wasm_bindgen]
pub fn period_growth_percent(points_json: &str) -> Result<f64, JsValue> {
    let points: Vec<SeriesPoint> = serde_json::from_str(points_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid series JSON: {}", e)))?;
    Ok(shared::period_growth_percent(&points, |p| p.date, |p| p.value))
}

fn normalize_as<T>(source: &str, row: &RawRecord, ctx: &NormalizeContext) -> Result<String, JsValue>
where
    T: Canonical + serde::Serialize,
{
    let table = T::table(source).ok_or_else(|| {
        JsValue::from_str(&format!("Unknown {} source: {}", T::ENTITY, source))
    })?;
    let record = T::normalize(table, row, ctx).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&record).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Normalize one raw row of a known source table into its canonical JSON
#[wasm_bindgen]
pub fn normalize_row(entity: &str, source: &str, row_json: &str, today: &str) -> Result<String, JsValue> {
    let row: RawRecord = serde_json::from_str(row_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid row JSON: {}", e)))?;
    let ctx = NormalizeContext {
        today: require_date(today)?,
    };
    let entity = Entity::ALL
        .into_iter()
        .find(|candidate| candidate.as_str() == entity)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown entity: {}", entity)))?;

    match entity {
        Entity::Production => normalize_as::<ProductionRecord>(source, &row, &ctx),
        Entity::Quality => normalize_as::<QualityRecord>(source, &row, &ctx),
        Entity::Sales => normalize_as::<SalesRecord>(source, &row, &ctx),
        Entity::Fattening => normalize_as::<FatteningRecord>(source, &row, &ctx),
        Entity::Staffing => normalize_as::<StaffingRecord>(source, &row, &ctx),
    }
}
