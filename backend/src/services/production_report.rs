//! Production report submission
//!
//! Appends one row to the unified production table and records a
//! notification for the outcome. Nothing is cached, so the next dashboard
//! fetch reads the new row straight from the source.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use shared::{
    validate_product_type, validate_production_record, Canonical, NormalizeContext,
    ProductionRecord, RawRecord, PRODUCTION_REPORTS,
};

use super::notification::{NewNotification, NotificationSink};
use crate::error::{AppError, AppResult};
use crate::sources::RecordSink;

/// Production report payload, in the unified table's column names
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProductionReport {
    #[validate(length(min = 1, max = 100, message = "Product type is required"))]
    pub product_type: String,

    #[validate(range(min = 0.0, message = "Raw material used cannot be negative"))]
    pub raw_material_used: f64,

    #[validate(range(min = 0.0, message = "Finished amount cannot be negative"))]
    pub finished_product: f64,

    /// Derived from the amounts when omitted
    #[validate(range(min = 0.0, max = 100.0, message = "Efficiency must be between 0 and 100"))]
    pub efficiency: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "Quality score must be between 0 and 100"))]
    pub quality_score: Option<f64>,

    pub production_date: NaiveDate,
}

impl NewProductionReport {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        validate_product_type(&self.product_type).map_err(|message| AppError::Validation {
            field: "product_type".to_string(),
            message: message.to_string(),
        })
    }

    fn into_row(self) -> RawRecord {
        let mut row = RawRecord::new();
        row.insert("product_type".into(), Value::from(self.product_type.trim()));
        row.insert("raw_material_used".into(), Value::from(self.raw_material_used));
        row.insert("finished_product".into(), Value::from(self.finished_product));
        if let Some(efficiency) = self.efficiency {
            row.insert("efficiency".into(), Value::from(efficiency));
        }
        if let Some(score) = self.quality_score {
            row.insert("quality_score".into(), Value::from(score));
        }
        row.insert(
            "production_date".into(),
            Value::from(self.production_date.format("%Y-%m-%d").to_string()),
        );
        row
    }
}

/// Production report service
#[derive(Clone)]
pub struct ProductionReportService {
    sink: Arc<dyn RecordSink>,
    notifications: Arc<dyn NotificationSink>,
}

impl ProductionReportService {
    pub fn new(sink: Arc<dyn RecordSink>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            notifications,
        }
    }

    /// Validate, store and announce one report. Returns the stored row in
    /// canonical form.
    pub async fn submit(
        &self,
        input: NewProductionReport,
        today: NaiveDate,
    ) -> AppResult<ProductionRecord> {
        match self.store(input, today).await {
            Ok(record) => {
                self.announce(NewNotification::submitted(
                    &record.product_type,
                    record.source_key.clone(),
                ))
                .await;
                Ok(record)
            }
            Err(e) => {
                self.announce(NewNotification::rejected(&e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn store(&self, input: NewProductionReport, today: NaiveDate) -> AppResult<ProductionRecord> {
        input.check()?;

        let stored = self.sink.insert(input.into_row()).await?;
        let record = ProductionRecord::normalize(&PRODUCTION_REPORTS, &stored, &NormalizeContext { today })
            .map_err(|e| AppError::Internal(format!("Stored report is unreadable: {}", e)))?;
        validate_production_record(&record)
            .map_err(|message| AppError::Internal(message.to_string()))?;

        tracing::info!(
            product_type = %record.product_type,
            key = ?record.source_key,
            "Production report stored"
        );
        Ok(record)
    }

    /// The report outcome stands even if the notification cannot be written
    async fn announce(&self, notification: NewNotification) {
        if let Err(e) = self.notifications.notify(notification).await {
            tracing::warn!(error = %e, "Failed to record notification");
        }
    }
}
