//! Staffing models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance for one department on one shift date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffingRecord {
    pub source_key: Option<String>,
    pub department: String,
    pub scheduled: u32,
    pub present: u32,
    /// 0-100, same ratio rule as production efficiency
    pub attendance_percent: f64,
    pub shift_date: NaiveDate,
}
