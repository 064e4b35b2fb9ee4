//! Staffing field tables

use super::{Canonical, CanonicalField, FieldTable, NormalizeContext, NormalizeError, RawRecord};
use crate::models::StaffingRecord;
use crate::projection::efficiency_percent;
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffingField {
    Department,
    Scheduled,
    Present,
    ShiftDate,
}

impl CanonicalField for StaffingField {
    fn name(self) -> &'static str {
        match self {
            StaffingField::Department => "department",
            StaffingField::Scheduled => "scheduled",
            StaffingField::Present => "present",
            StaffingField::ShiftDate => "shift_date",
        }
    }
}

pub static STAFF_ATTENDANCE: FieldTable<StaffingField> = FieldTable {
    source: "staff_attendance",
    date_column: "shift_date",
    key_column: "id",
    columns: &[
        (StaffingField::Department, "department"),
        (StaffingField::Scheduled, "scheduled_staff"),
        (StaffingField::Present, "present_staff"),
        (StaffingField::ShiftDate, "shift_date"),
    ],
};

pub static SHIFT_ROSTER: FieldTable<StaffingField> = FieldTable {
    source: "shift_roster",
    date_column: "roster_date",
    key_column: "id",
    columns: &[
        (StaffingField::Department, "team"),
        (StaffingField::Scheduled, "rostered"),
        (StaffingField::Present, "checked_in"),
        (StaffingField::ShiftDate, "roster_date"),
    ],
};

pub static STAFFING_TABLES: &[&FieldTable<StaffingField>] = &[&STAFF_ATTENDANCE, &SHIFT_ROSTER];

impl Canonical for StaffingRecord {
    type Field = StaffingField;

    const ENTITY: Entity = Entity::Staffing;

    fn tables() -> &'static [&'static FieldTable<StaffingField>] {
        STAFFING_TABLES
    }

    fn normalize(
        table: &FieldTable<StaffingField>,
        raw: &RawRecord,
        _ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError> {
        let row = table.reader(raw);
        let headcount = |field| -> Result<u32, NormalizeError> {
            let count = row.non_negative(field)?.round();
            if count > u32::MAX as f64 {
                return Err(NormalizeError::InvalidValue {
                    field: StaffingField::name(field),
                    value: count.to_string(),
                });
            }
            Ok(count as u32)
        };

        let scheduled = headcount(StaffingField::Scheduled)?;
        let present = headcount(StaffingField::Present)?;

        Ok(StaffingRecord {
            source_key: row.source_key(),
            department: row.required_text(StaffingField::Department)?,
            scheduled,
            present,
            attendance_percent: efficiency_percent(present as f64, scheduled as f64),
            shift_date: row.required_date(StaffingField::ShiftDate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::raw;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ctx() -> NormalizeContext {
        NormalizeContext {
            today: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
        }
    }

    #[test]
    fn test_attendance_percent() {
        let row = raw(json!({
            "department": "Milking parlour",
            "scheduled_staff": 8,
            "present_staff": 7,
            "shift_date": "2026-06-14"
        }));
        let record = StaffingRecord::normalize(&STAFF_ATTENDANCE, &row, &ctx()).unwrap();

        assert_eq!(record.scheduled, 8);
        assert_eq!(record.present, 7);
        assert_eq!(record.attendance_percent, 88.0);
    }

    #[test]
    fn test_roster_without_schedule() {
        let row = raw(json!({"team": "Drying yard", "checked_in": 3, "roster_date": "2026-06-14"}));
        let record = StaffingRecord::normalize(&SHIFT_ROSTER, &row, &ctx()).unwrap();
        assert_eq!(record.attendance_percent, 0.0);
    }
}
