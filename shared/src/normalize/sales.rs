//! Sales field tables

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::{Canonical, CanonicalField, FieldTable, NormalizeContext, NormalizeError, RawRecord};
use crate::models::SalesRecord;
use crate::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesField {
    Product,
    Customer,
    Quantity,
    UnitPrice,
    TotalAmount,
    SaleDate,
}

impl CanonicalField for SalesField {
    fn name(self) -> &'static str {
        match self {
            SalesField::Product => "product",
            SalesField::Customer => "customer",
            SalesField::Quantity => "quantity",
            SalesField::UnitPrice => "unit_price",
            SalesField::TotalAmount => "total_amount",
            SalesField::SaleDate => "sale_date",
        }
    }
}

/// Domestic sales ledger
pub static SALES_RECORDS: FieldTable<SalesField> = FieldTable {
    source: "sales_records",
    date_column: "sale_date",
    key_column: "id",
    columns: &[
        (SalesField::Product, "product_name"),
        (SalesField::Customer, "customer_name"),
        (SalesField::Quantity, "quantity"),
        (SalesField::UnitPrice, "unit_price"),
        (SalesField::TotalAmount, "total_amount"),
        (SalesField::SaleDate, "sale_date"),
    ],
};

/// Coffee export contracts
pub static EXPORT_ORDERS: FieldTable<SalesField> = FieldTable {
    source: "export_orders",
    date_column: "shipment_date",
    key_column: "id",
    columns: &[
        (SalesField::Product, "coffee_grade"),
        (SalesField::Customer, "buyer"),
        (SalesField::Quantity, "quantity_kg"),
        (SalesField::UnitPrice, "price_per_kg"),
        (SalesField::TotalAmount, "contract_value"),
        (SalesField::SaleDate, "shipment_date"),
    ],
};

pub static SALES_TABLES: &[&FieldTable<SalesField>] = &[&SALES_RECORDS, &EXPORT_ORDERS];

impl Canonical for SalesRecord {
    type Field = SalesField;

    const ENTITY: Entity = Entity::Sales;

    fn tables() -> &'static [&'static FieldTable<SalesField>] {
        SALES_TABLES
    }

    fn normalize(
        table: &FieldTable<SalesField>,
        raw: &RawRecord,
        _ctx: &NormalizeContext,
    ) -> Result<Self, NormalizeError> {
        let row = table.reader(raw);

        let product = row.required_text(SalesField::Product)?;
        let quantity = row.non_negative(SalesField::Quantity)?;
        let unit_price = row.decimal(SalesField::UnitPrice)?.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(NormalizeError::Negative {
                field: SalesField::UnitPrice.name(),
            });
        }

        let total_amount = match row.decimal(SalesField::TotalAmount)? {
            Some(total) if total < Decimal::ZERO => {
                return Err(NormalizeError::Negative {
                    field: SalesField::TotalAmount.name(),
                });
            }
            Some(total) => total,
            None => {
                let quantity = Decimal::from_f64(quantity).ok_or(NormalizeError::InvalidValue {
                    field: SalesField::Quantity.name(),
                    value: quantity.to_string(),
                })?;
                quantity
                    .checked_mul(unit_price)
                    .ok_or_else(|| NormalizeError::InvalidValue {
                        field: SalesField::TotalAmount.name(),
                        value: format!("{} x {}", quantity, unit_price),
                    })?
                    .round_dp(2)
            }
        };

        Ok(SalesRecord {
            source_key: row.source_key(),
            product,
            customer: row.text(SalesField::Customer),
            quantity,
            unit_price,
            total_amount,
            sale_date: row.required_date(SalesField::SaleDate)?,
        })
    }
}
