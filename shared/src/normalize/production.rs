//! Production field tables

use super::{Canonical, CanonicalField, FieldTable, NormalizeContext, NormalizeError, RawRecord};
use crate::models::{ProductionRecord, DEFAULT_QUALITY_SCORE};
use crate::projection::efficiency_percent;
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionField {
    ProductType,
    RawMaterialUsed,
    FinishedAmount,
    EfficiencyPercent,
    QualityScore,
    ProductionDate,
}

impl CanonicalField for ProductionField {
    fn name(self) -> &'static str {
        match self {
            ProductionField::ProductType => "product_type",
            ProductionField::RawMaterialUsed => "raw_material_used",
            ProductionField::FinishedAmount => "finished_amount",
            ProductionField::EfficiencyPercent => "efficiency_percent",
            ProductionField::QualityScore => "quality_score",
            ProductionField::ProductionDate => "production_date",
        }
    }
}

/// Unified production table
pub static PRODUCTION_REPORTS: FieldTable<ProductionField> = FieldTable {
    source: "production_reports",
    date_column: "production_date",
    key_column: "id",
    columns: &[
        (ProductionField::ProductType, "product_type"),
        (ProductionField::RawMaterialUsed, "raw_material_used"),
        (ProductionField::FinishedAmount, "finished_product"),
        (ProductionField::EfficiencyPercent, "efficiency"),
        (ProductionField::QualityScore, "quality_score"),
        (ProductionField::ProductionDate, "production_date"),
    ],
};

/// Legacy dairy table, still the only one populated on some sites
pub static CHEESE_PRODUCTION: FieldTable<ProductionField> = FieldTable {
    source: "cheese_production",
    date_column: "production_date",
    key_column: "id",
    columns: &[
        (ProductionField::ProductType, "cheese_type"),
        (ProductionField::RawMaterialUsed, "milk_volume"),
        (ProductionField::FinishedAmount, "expected_yield"),
        (ProductionField::QualityScore, "quality_rating"),
        (ProductionField::ProductionDate, "production_date"),
    ],
};

/// Coffee export processing batches (cherry in, green bean out)
pub static COFFEE_PROCESSING: FieldTable<ProductionField> = FieldTable {
    source: "coffee_processing",
    date_column: "start_date",
    key_column: "id",
    columns: &[
        (ProductionField::ProductType, "coffee_type"),
        (ProductionField::RawMaterialUsed, "cherry_weight_kg"),
        (ProductionField::FinishedAmount, "green_bean_weight_kg"),
        (ProductionField::EfficiencyPercent, "processing_yield_percent"),
        (ProductionField::QualityScore, "cupping_score"),
        (ProductionField::ProductionDate, "start_date"),
    ],
};

pub static PRODUCTION_TABLES: &[&FieldTable<ProductionField>] =
    &[&PRODUCTION_REPORTS, &CHEESE_PRODUCTION, &COFFEE_PROCESSING];

impl Canonical for ProductionRecord {
    type Field = ProductionField;

    const ENTITY: Entity = Entity::Production;

    fn tables() -> &'static [&'static FieldTable<ProductionField>] {
        PRODUCTION_TABLES
    }

    fn normalize(
        table: &FieldTable<ProductionField>,
        raw: &RawRecord,
        _ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError> {
        let row = table.reader(raw);

        let product_type = row.required_text(ProductionField::ProductType)?;
        let raw_material_used = row.non_negative(ProductionField::RawMaterialUsed)?;
        let finished_amount = row.non_negative(ProductionField::FinishedAmount)?;

        // A supplied efficiency always wins over the derived one.
        let efficiency_percent = match row.number(ProductionField::EfficiencyPercent)? {
            Some(supplied) => supplied.clamp(0.0, 100.0),
            None => efficiency_percent(finished_amount, raw_material_used),
        };
        let quality_score = row
            .number(ProductionField::QualityScore)?
            .map_or(DEFAULT_QUALITY_SCORE, |score| score.clamp(0.0, 100.0));

        Ok(ProductionRecord {
            source_key: row.source_key(),
            product_type,
            raw_material_used,
            finished_amount,
            efficiency_percent,
            quality_score,
            production_date: row.required_date(ProductionField::ProductionDate)?,
        })
    }
}
