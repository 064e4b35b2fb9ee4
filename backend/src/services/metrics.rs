//! Metrics aggregation
//!
//! Resolves each entity through its fallback chain, then groups and reduces
//! the canonical records into dashboard views. Every call starts from the
//! sources; no result outlives the request that built it.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use shared::{
    average_quality_score, efficiency_percent, mean, period_growth_percent,
    validate_fattening_record, validate_production_record, CompletionEstimate, DashboardMetrics,
    DepartmentAttendance, FatteningRecord, FatteningSummary, FetchFilter, NormalizeContext,
    ProductSales, ProductSummary, ProductionMetrics, ProductionRecord, Provenance, QualityMetrics,
    QualityPoint, QualityRecord, SalesRecord, SalesSummary, StaffingRecord, StaffingSummary,
};

use crate::sources::SourceRegistry;

/// Days counted by `reports_this_week`, today included
const WEEK_DAYS: u64 = 7;

/// Unexpected failure while reducing records
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AggregationError {
    pub message: String,
    pub cause: Option<String>,
}

impl AggregationError {
    fn new(message: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }
}

/// One dashboard view with the provenance of every entity it read
#[derive(Debug, Clone)]
pub struct View<M> {
    pub metrics: M,
    /// The view's own entity first, supporting entities after
    pub provenance: Vec<Provenance>,
}

impl<M> View<M> {
    /// The view's own entity could not be read from any candidate
    pub fn unavailable(&self) -> bool {
        self.provenance.first().is_some_and(Provenance::all_failed)
    }
}

/// Builds dashboard metrics from the configured sources
#[derive(Clone)]
pub struct MetricsAggregator {
    registry: Arc<SourceRegistry>,
    filter: FetchFilter,
}

impl MetricsAggregator {
    pub fn new(registry: Arc<SourceRegistry>, fetch_limit: u32) -> Self {
        Self {
            registry,
            filter: FetchFilter::most_recent(fetch_limit),
        }
    }

    pub async fn production(&self, today: NaiveDate) -> Result<View<ProductionMetrics>, AggregationError> {
        let resolved = self.registry.production.resolve(self.filter, &context(today)).await;
        let metrics = summarize_production(&resolved.records, today)?;
        Ok(View {
            metrics,
            provenance: vec![resolved.provenance],
        })
    }

    pub async fn quality(&self, today: NaiveDate) -> Result<View<QualityMetrics>, AggregationError> {
        let ctx = context(today);
        let quality = self.registry.quality.resolve(self.filter, &ctx).await;
        let production = self.registry.production.resolve(self.filter, &ctx).await;
        let metrics = summarize_quality(&quality.records, &production.records)?;
        Ok(View {
            metrics,
            provenance: vec![quality.provenance, production.provenance],
        })
    }

    pub async fn fattening(&self, today: NaiveDate) -> Result<View<FatteningSummary>, AggregationError> {
        let resolved = self.registry.fattening.resolve(self.filter, &context(today)).await;
        let metrics = summarize_fattening(resolved.records, today)?;
        Ok(View {
            metrics,
            provenance: vec![resolved.provenance],
        })
    }

    pub async fn sales(&self, today: NaiveDate) -> Result<View<SalesSummary>, AggregationError> {
        let resolved = self.registry.sales.resolve(self.filter, &context(today)).await;
        let metrics = summarize_sales(&resolved.records)?;
        Ok(View {
            metrics,
            provenance: vec![resolved.provenance],
        })
    }

    pub async fn staffing(&self, today: NaiveDate) -> Result<View<StaffingSummary>, AggregationError> {
        let resolved = self.registry.staffing.resolve(self.filter, &context(today)).await;
        let metrics = summarize_staffing(&resolved.records)?;
        Ok(View {
            metrics,
            provenance: vec![resolved.provenance],
        })
    }

    /// Full dashboard. Entities are resolved one after another and the
    /// result is only returned once every view has been reduced.
    pub async fn refresh(&self, today: NaiveDate) -> Result<DashboardMetrics, AggregationError> {
        let ctx = context(today);
        let production = self.registry.production.resolve(self.filter, &ctx).await;
        let quality = self.registry.quality.resolve(self.filter, &ctx).await;
        let fattening = self.registry.fattening.resolve(self.filter, &ctx).await;
        let sales = self.registry.sales.resolve(self.filter, &ctx).await;
        let staffing = self.registry.staffing.resolve(self.filter, &ctx).await;

        let metrics = DashboardMetrics {
            generated_on: today,
            production: summarize_production(&production.records, today)?,
            quality: summarize_quality(&quality.records, &production.records)?,
            sales: summarize_sales(&sales.records)?,
            staffing: summarize_staffing(&staffing.records)?,
            fattening: summarize_fattening(fattening.records, today)?,
            provenance: vec![
                production.provenance,
                quality.provenance,
                fattening.provenance,
                sales.provenance,
                staffing.provenance,
            ],
        };

        tracing::info!(
            %today,
            reports = metrics.production.report_count,
            head_count = metrics.fattening.head_count,
            "Dashboard refreshed"
        );
        Ok(metrics)
    }
}

fn context(today: NaiveDate) -> NormalizeContext {
    NormalizeContext { today }
}

fn finite(value: f64, what: &str) -> Result<f64, AggregationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AggregationError::new(
            format!("Could not compute {}", what),
            format!("non-finite result {}", value),
        ))
    }
}

fn record_label(key: &Option<String>) -> &str {
    key.as_deref().unwrap_or("<no key>")
}

// ============================================================================
// Production
// ============================================================================

pub fn summarize_production(
    records: &[ProductionRecord],
    today: NaiveDate,
) -> Result<ProductionMetrics, AggregationError> {
    let mut groups: BTreeMap<&str, ProductSummary> = BTreeMap::new();

    for record in records {
        validate_production_record(record).map_err(|message| {
            AggregationError::new(
                "Production record failed validation",
                format!("{}: {}", record_label(&record.source_key), message),
            )
        })?;

        let group = groups
            .entry(record.product_type.as_str())
            .or_insert_with(|| ProductSummary {
                product_type: record.product_type.clone(),
                batch_count: 0,
                total_raw_material: 0.0,
                total_finished: 0.0,
                max_efficiency_percent: 0.0,
            });
        group.batch_count += 1;
        group.total_raw_material += record.raw_material_used;
        group.total_finished += record.finished_amount;
        group.max_efficiency_percent = group.max_efficiency_percent.max(record.efficiency_percent);
    }

    let products: Vec<ProductSummary> = groups.into_values().collect();
    let total_finished = finite(
        products.iter().map(|p| p.total_finished).sum(),
        "total finished amount",
    )?;

    let week_start = today.checked_sub_days(Days::new(WEEK_DAYS - 1)).unwrap_or(NaiveDate::MIN);
    let reports_this_week = records
        .iter()
        .filter(|r| (week_start..=today).contains(&r.production_date))
        .count();

    Ok(ProductionMetrics {
        products,
        total_finished,
        report_count: records.len(),
        reports_this_week,
        growth_percent: finite(
            period_growth_percent(records, |r| r.production_date, |r| r.finished_amount),
            "production growth",
        )?,
    })
}

// ============================================================================
// Quality
// ============================================================================

pub fn summarize_quality(
    quality: &[QualityRecord],
    production: &[ProductionRecord],
) -> Result<QualityMetrics, AggregationError> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize, f64)> = BTreeMap::new();
    for record in quality {
        let (score_sum, count, volume) = by_date.entry(record.date).or_insert((0.0, 0, 0.0));
        *score_sum += record.average_quality;
        *count += 1;
        *volume += record.volume;
    }

    let series = by_date
        .into_iter()
        .map(|(date, (score_sum, count, volume))| {
            Ok(QualityPoint {
                date,
                average_quality: finite(score_sum / count as f64, "daily quality")?,
                volume: finite(volume, "daily volume")?,
            })
        })
        .collect::<Result<Vec<_>, AggregationError>>()?;

    Ok(QualityMetrics {
        series,
        average_quality_score: finite(
            average_quality_score(quality, production),
            "average quality score",
        )?,
    })
}

// ============================================================================
// Fattening
// ============================================================================

/// Keeps the first row seen per animal; resolved rows arrive newest first
fn dedupe_animals(records: Vec<FatteningRecord>) -> Vec<FatteningRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|animal| seen.insert(animal.cattle_id.clone()))
        .collect()
}

pub fn summarize_fattening(
    records: Vec<FatteningRecord>,
    today: NaiveDate,
) -> Result<FatteningSummary, AggregationError> {
    let animals = dedupe_animals(records);
    for animal in &animals {
        validate_fattening_record(animal).map_err(|message| {
            AggregationError::new(
                "Fattening record failed validation",
                format!("{}: {}", animal.cattle_id, message),
            )
        })?;
    }

    let ready_now = animals
        .iter()
        .filter(|a| a.estimated_completion == CompletionEstimate::ReadyNow)
        .count();
    let without_projection = animals
        .iter()
        .filter(|a| a.estimated_completion == CompletionEstimate::NotAvailable)
        .count();
    let average_days_to_completion = mean(
        animals
            .iter()
            .filter(|a| matches!(a.estimated_completion, CompletionEstimate::Projected(_)))
            .filter_map(|a| a.estimated_completion.days_from(today))
            .map(|days| days as f64),
    );

    Ok(FatteningSummary {
        head_count: animals.len(),
        average_daily_gain: finite(
            mean(animals.iter().map(|a| a.daily_gain)).unwrap_or(0.0),
            "average daily gain",
        )?,
        average_current_weight: mean(animals.iter().filter_map(|a| a.current_weight)).unwrap_or(0.0),
        average_target_weight: mean(animals.iter().filter_map(|a| a.target_weight)).unwrap_or(0.0),
        ready_now,
        without_projection,
        average_days_to_completion,
        animals,
    })
}

// ============================================================================
// Sales
// ============================================================================

pub fn summarize_sales(records: &[SalesRecord]) -> Result<SalesSummary, AggregationError> {
    let mut by_product: BTreeMap<&str, ProductSales> = BTreeMap::new();
    let mut total_revenue = Decimal::ZERO;
    let mut total_quantity = 0.0;

    for record in records {
        total_revenue = total_revenue
            .checked_add(record.total_amount)
            .ok_or_else(|| AggregationError::new("Could not total sales revenue", "decimal overflow"))?;
        total_quantity += record.quantity;

        let product = by_product
            .entry(record.product.as_str())
            .or_insert_with(|| ProductSales {
                product: record.product.clone(),
                quantity: 0.0,
                revenue: Decimal::ZERO,
            });
        product.quantity += record.quantity;
        product.revenue = product.revenue.checked_add(record.total_amount).ok_or_else(|| {
            AggregationError::new("Could not total product revenue", "decimal overflow")
        })?;
    }

    Ok(SalesSummary {
        total_revenue,
        total_quantity: finite(total_quantity, "total quantity sold")?,
        products: by_product.into_values().collect(),
        growth_percent: finite(
            period_growth_percent(
                records,
                |r| r.sale_date,
                |r| r.total_amount.to_f64().unwrap_or(0.0),
            ),
            "sales growth",
        )?,
    })
}

// ============================================================================
// Staffing
// ============================================================================

pub fn summarize_staffing(records: &[StaffingRecord]) -> Result<StaffingSummary, AggregationError> {
    let mut by_department: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in records {
        let (scheduled, present) = by_department.entry(record.department.as_str()).or_default();
        *scheduled += u64::from(record.scheduled);
        *present += u64::from(record.present);
    }

    let departments = by_department
        .into_iter()
        .map(|(department, (scheduled, present))| {
            let to_u32 = |count: u64| {
                u32::try_from(count).map_err(|e| {
                    AggregationError::new(format!("Headcount overflow in {}", department), e)
                })
            };
            Ok(DepartmentAttendance {
                department: department.to_string(),
                scheduled: to_u32(scheduled)?,
                present: to_u32(present)?,
                attendance_percent: efficiency_percent(present as f64, scheduled as f64),
            })
        })
        .collect::<Result<Vec<_>, AggregationError>>()?;

    let scheduled: u64 = departments.iter().map(|d| u64::from(d.scheduled)).sum();
    let present: u64 = departments.iter().map(|d| u64::from(d.present)).sum();

    Ok(StaffingSummary {
        departments,
        overall_attendance_percent: efficiency_percent(present as f64, scheduled as f64),
    })
}
