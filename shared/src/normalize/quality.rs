//! Quality field tables
//!
//! Two kinds of table feed quality records. Checklist tables carry a
//! pass/fail status per check and are scored as the share of passed checks;
//! reception and production tables carry a score column directly.

use super::{Canonical, CanonicalField, FieldTable, NormalizeContext, NormalizeError, RawRecord};
use crate::models::{QualityOrigin, QualityRecord};
use crate::projection::checklist_score;
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityField {
    Date,
    Score,
    Volume,
    TemperatureCheck,
    PhCheck,
    MoistureCheck,
    FatCheck,
    ProteinCheck,
    SaltCheck,
}

/// Recognized checks; their count is the checklist denominator
pub const CHECKLIST_FIELDS: [QualityField; 6] = [
    QualityField::TemperatureCheck,
    QualityField::PhCheck,
    QualityField::MoistureCheck,
    QualityField::FatCheck,
    QualityField::ProteinCheck,
    QualityField::SaltCheck,
];

pub const PASS_STATUS: &str = "pass";

impl CanonicalField for QualityField {
    fn name(self) -> &'static str {
        match self {
            QualityField::Date => "date",
            QualityField::Score => "average_quality",
            QualityField::Volume => "volume",
            QualityField::TemperatureCheck => "temperature_check",
            QualityField::PhCheck => "ph_check",
            QualityField::MoistureCheck => "moisture_check",
            QualityField::FatCheck => "fat_check",
            QualityField::ProteinCheck => "protein_check",
            QualityField::SaltCheck => "salt_check",
        }
    }
}

/// Dedicated checklist table; preferred when populated
pub static QUALITY_CHECKS: FieldTable<QualityField> = FieldTable {
    source: "quality_checks",
    date_column: "check_date",
    key_column: "id",
    columns: &[
        (QualityField::Date, "check_date"),
        (QualityField::Volume, "batch_volume"),
        (QualityField::TemperatureCheck, "temperature_status"),
        (QualityField::PhCheck, "ph_status"),
        (QualityField::MoistureCheck, "moisture_status"),
        (QualityField::FatCheck, "fat_status"),
        (QualityField::ProteinCheck, "protein_status"),
        (QualityField::SaltCheck, "salt_status"),
    ],
};

/// Raw milk reception with a lab score per delivery
pub static MILK_RECEPTION: FieldTable<QualityField> = FieldTable {
    source: "milk_reception",
    date_column: "reception_date",
    key_column: "id",
    columns: &[
        (QualityField::Date, "reception_date"),
        (QualityField::Score, "quality_score"),
        (QualityField::Volume, "volume_liters"),
    ],
};

/// Quality score column of the unified production table
pub static PRODUCTION_QUALITY: FieldTable<QualityField> = FieldTable {
    source: "production_reports",
    date_column: "production_date",
    key_column: "id",
    columns: &[
        (QualityField::Date, "production_date"),
        (QualityField::Score, "quality_score"),
        (QualityField::Volume, "finished_product"),
    ],
};

pub static QUALITY_TABLES: &[&FieldTable<QualityField>] =
    &[&QUALITY_CHECKS, &MILK_RECEPTION, &PRODUCTION_QUALITY];

impl FieldTable<QualityField> {
    /// Checklist tables map at least one recognized check
    pub fn is_checklist(&self) -> bool {
        CHECKLIST_FIELDS.iter().any(|field| self.maps(*field))
    }
}

impl Canonical for QualityRecord {
    type Field = QualityField;

    const ENTITY: Entity = Entity::Quality;

    fn tables() -> &'static [&'static FieldTable<QualityField>] {
        QUALITY_TABLES
    }

    fn normalize(
        table: &FieldTable<QualityField>,
        raw: &RawRecord,
        _ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError> {
        let row = table.reader(raw);
        let date = row.required_date(QualityField::Date)?;
        let volume = row.non_negative(QualityField::Volume)?;

        let (average_quality, origin) = if table.is_checklist() {
            let passed = CHECKLIST_FIELDS
                .iter()
                .filter(|field| {
                    row.text(**field)
                        .is_some_and(|status| status.eq_ignore_ascii_case(PASS_STATUS))
                })
                .count();
            (
                checklist_score(passed, CHECKLIST_FIELDS.len()),
                QualityOrigin::Checklist,
            )
        } else {
            let score = row
                .number(QualityField::Score)?
                .ok_or(NormalizeError::MissingField {
                    field: QualityField::Score.name(),
                })?;
            (score.clamp(0.0, 100.0), QualityOrigin::DirectScore)
        };

        Ok(QualityRecord {
            source_key: row.source_key(),
            date,
            average_quality,
            volume,
            origin,
        })
    }
}
