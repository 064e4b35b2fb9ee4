//! Cattle fattening field tables
//!
//! Weights that are missing, non-numeric or not positive are carried as
//! `None`; the projections then fall back to their sentinels instead of
//! rejecting the animal.

use super::{Canonical, CanonicalField, FieldTable, NormalizeContext, NormalizeError, RawRecord};
use crate::models::FatteningRecord;
use crate::projection::{clamp_daily_gain, daily_gain, estimated_completion, DEFAULT_DAILY_GAIN};
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatteningField {
    CattleId,
    EntryDate,
    EntryWeight,
    CurrentWeight,
    TargetWeight,
    DailyGain,
}

impl CanonicalField for FatteningField {
    fn name(self) -> &'static str {
        match self {
            FatteningField::CattleId => "cattle_id",
            FatteningField::EntryDate => "entry_date",
            FatteningField::EntryWeight => "entry_weight",
            FatteningField::CurrentWeight => "current_weight",
            FatteningField::TargetWeight => "target_weight",
            FatteningField::DailyGain => "daily_gain",
        }
    }
}

/// One row per animal in the program
pub static CATTLE_FATTENING: FieldTable<FatteningField> = FieldTable {
    source: "cattle_fattening",
    date_column: "entry_date",
    key_column: "id",
    columns: &[
        (FatteningField::CattleId, "tag_number"),
        (FatteningField::EntryDate, "entry_date"),
        (FatteningField::EntryWeight, "entry_weight"),
        (FatteningField::CurrentWeight, "current_weight"),
        (FatteningField::TargetWeight, "target_weight"),
    ],
};

/// Older weighing log, one row per weighing
pub static LIVESTOCK_WEIGHINGS: FieldTable<FatteningField> = FieldTable {
    source: "livestock_weighings",
    date_column: "weighed_on",
    key_column: "id",
    columns: &[
        (FatteningField::CattleId, "cattle_id"),
        (FatteningField::EntryDate, "arrival_date"),
        (FatteningField::EntryWeight, "arrival_weight"),
        (FatteningField::CurrentWeight, "weight_kg"),
        (FatteningField::TargetWeight, "target_weight_kg"),
        (FatteningField::DailyGain, "avg_daily_gain"),
    ],
};

pub static FATTENING_TABLES: &[&FieldTable<FatteningField>] =
    &[&CATTLE_FATTENING, &LIVESTOCK_WEIGHINGS];

impl Canonical for FatteningRecord {
    type Field = FatteningField;

    const ENTITY: Entity = Entity::Fattening;

    fn tables() -> &'static [&'static FieldTable<FatteningField>] {
        FATTENING_TABLES
    }

    fn normalize(
        table: &FieldTable<FatteningField>,
        raw: &RawRecord,
        ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError> {
        let row = table.reader(raw);
        let source_key = row.source_key();
        let cattle_id = row
            .text(FatteningField::CattleId)
            .or_else(|| source_key.clone())
            .ok_or(NormalizeError::MissingField {
                field: FatteningField::CattleId.name(),
            })?;

        let weight = |field| row.lenient_number(field).filter(|kg| *kg > 0.0);
        let entry_weight = weight(FatteningField::EntryWeight);
        let current_weight = weight(FatteningField::CurrentWeight);
        let target_weight = weight(FatteningField::TargetWeight);
        let entry_date = row.lenient_date(FatteningField::EntryDate);

        let gain = match (
            row.lenient_number(FatteningField::DailyGain).filter(|g| *g > 0.0),
            entry_weight,
            current_weight,
            entry_date,
        ) {
            (Some(supplied), ..) => clamp_daily_gain(supplied),
            (None, Some(entry), Some(current), Some(entered)) => {
                daily_gain(entry, current, entered, ctx.today)
            }
            _ => DEFAULT_DAILY_GAIN,
        };

        let estimated_completion = estimated_completion(
            current_weight.unwrap_or(f64::NAN),
            target_weight.unwrap_or(f64::NAN),
            gain,
            ctx.today,
        );

        Ok(FatteningRecord {
            source_key,
            cattle_id,
            entry_date,
            entry_weight,
            current_weight,
            target_weight,
            daily_gain: gain,
            estimated_completion,
        })
    }
}
