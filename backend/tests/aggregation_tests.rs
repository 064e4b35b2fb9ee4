//! Metrics aggregation tests
//!
//! Tests for dashboard assembly over in-memory sources including:
//! - Views built from whichever source in each chain has data
//! - Projections carried through to the fattening view
//! - Independent results from overlapping refreshes

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use farm_metrics::config::SourceChains;
use farm_metrics::services::MetricsAggregator;
use farm_metrics::sources::{MemoryTables, SourceRegistry};
use shared::{CompletionEstimate, Entity, RawRecord, DEFAULT_QUALITY_SCORE};

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

fn setup() -> (MetricsAggregator, MemoryTables) {
    let (registry, tables) = SourceRegistry::in_memory(&SourceChains::default()).unwrap();
    (MetricsAggregator::new(Arc::new(registry), 10), tables)
}

async fn seed(tables: &MemoryTables, table: &str, rows: Vec<Value>) {
    tables
        .get(table)
        .unwrap()
        .seed(rows.into_iter().map(raw).collect())
        .await;
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_empty_sources_give_zeroed_dashboard() {
    let (aggregator, _tables) = setup();
    let metrics = aggregator.refresh(today()).await.unwrap();

    assert_eq!(metrics.generated_on, today());
    assert_eq!(metrics.production.report_count, 0);
    assert!(metrics.production.products.is_empty());
    assert_eq!(metrics.quality.average_quality_score, DEFAULT_QUALITY_SCORE);
    assert_eq!(metrics.fattening.head_count, 0);
    assert_eq!(metrics.sales.total_revenue, Decimal::ZERO);
    assert_eq!(metrics.provenance.len(), Entity::ALL.len());
    assert!(metrics.provenance.iter().all(|p| p.selected_source.is_none()));
}

#[tokio::test]
async fn test_production_from_legacy_table() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "cheese_production",
        vec![
            json!({"cheese_type": "Cheddar", "milk_volume": 100, "expected_yield": 80, "production_date": "2026-06-14"}),
            json!({"cheese_type": "Cheddar", "milk_volume": 100, "expected_yield": 70, "production_date": "2026-06-02"}),
            json!({"cheese_type": "Brie", "milk_volume": 40, "expected_yield": 10, "production_date": "2026-06-13"}),
        ],
    )
    .await;

    let view = aggregator.production(today()).await.unwrap();

    assert_eq!(view.provenance[0].selected_source.as_deref(), Some("cheese_production"));
    let cheddar = view
        .metrics
        .products
        .iter()
        .find(|p| p.product_type == "Cheddar")
        .unwrap();
    assert_eq!(cheddar.total_finished, 150.0);
    assert_eq!(cheddar.max_efficiency_percent, 80.0);
    assert_eq!(view.metrics.report_count, 3);
    assert_eq!(view.metrics.reports_this_week, 2);
}

#[tokio::test]
async fn test_checklist_quality_preferred_over_reception() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "quality_checks",
        vec![json!({
            "check_date": "2026-06-14",
            "batch_volume": 200,
            "temperature_status": "pass",
            "ph_status": "PASS",
            "moisture_status": "fail",
            "fat_status": "pass",
            "protein_status": null,
            "salt_status": "pass"
        })],
    )
    .await;
    seed(
        &tables,
        "milk_reception",
        vec![json!({"reception_date": "2026-06-14", "quality_score": 40, "volume_liters": 900})],
    )
    .await;

    let view = aggregator.quality(today()).await.unwrap();

    assert_eq!(view.provenance[0].selected_source.as_deref(), Some("quality_checks"));
    assert_eq!(view.metrics.series.len(), 1);
    // four of six checks passed
    assert_eq!(view.metrics.series[0].average_quality, 67.0);
    assert_eq!(view.metrics.average_quality_score, 67.0);
}

#[tokio::test]
async fn test_fattening_projection_through_dashboard() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "cattle_fattening",
        vec![
            json!({"tag_number": "TH-1", "entry_date": "2026-06-05", "entry_weight": 300, "current_weight": 306, "target_weight": 450}),
            json!({"tag_number": "TH-2", "entry_date": "2026-03-01", "entry_weight": 280, "current_weight": 505, "target_weight": 500}),
            json!({"tag_number": "TH-3", "entry_date": "2026-04-01", "current_weight": "n/a", "target_weight": 500}),
        ],
    )
    .await;

    let view = aggregator.fattening(today()).await.unwrap();
    let summary = view.metrics;

    assert_eq!(summary.head_count, 3);
    assert_eq!(summary.ready_now, 1);
    assert_eq!(summary.without_projection, 1);
    let first = summary.animals.iter().find(|a| a.cattle_id == "TH-1").unwrap();
    assert!((first.daily_gain - 0.6).abs() < 1e-9);
    assert_eq!(
        first.estimated_completion,
        CompletionEstimate::Projected(NaiveDate::from_ymd_opt(2027, 2, 10).unwrap())
    );
    assert_eq!(summary.average_days_to_completion, Some(240.0));
}

#[tokio::test]
async fn test_sales_and_staffing_views() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "export_orders",
        vec![
            json!({"coffee_grade": "Specialty", "buyer": "Kyoto Roasters", "quantity_kg": 600, "price_per_kg": "9.50", "shipment_date": "2026-06-01"}),
            json!({"coffee_grade": "Commercial", "quantity_kg": 1000, "price_per_kg": "4.25", "shipment_date": "2026-06-10"}),
        ],
    )
    .await;
    seed(
        &tables,
        "shift_roster",
        vec![
            json!({"team": "Drying yard", "rostered": 5, "checked_in": 4, "roster_date": "2026-06-14"}),
            json!({"team": "Wet mill", "rostered": 3, "checked_in": 3, "roster_date": "2026-06-14"}),
        ],
    )
    .await;

    let sales = aggregator.sales(today()).await.unwrap();
    assert_eq!(sales.provenance[0].selected_source.as_deref(), Some("export_orders"));
    assert_eq!(sales.metrics.total_revenue, Decimal::new(995000, 2));
    assert_eq!(sales.metrics.total_quantity, 1600.0);

    let staffing = aggregator.staffing(today()).await.unwrap();
    assert_eq!(staffing.metrics.departments.len(), 2);
    assert_eq!(staffing.metrics.departments[0].attendance_percent, 80.0);
    assert_eq!(staffing.metrics.overall_attendance_percent, 88.0);
}

#[tokio::test]
async fn test_oversized_sales_row_is_skipped() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "sales_records",
        vec![
            json!({"product_name": "Milk", "quantity": 1.0e20, "unit_price": "1000000000000", "sale_date": "2026-06-10"}),
            json!({"product_name": "Butter", "quantity": 4, "unit_price": "2.50", "sale_date": "2026-06-09"}),
        ],
    )
    .await;

    let sales = aggregator.sales(today()).await.unwrap();

    assert_eq!(sales.provenance[0].selected_source.as_deref(), Some("sales_records"));
    assert_eq!(sales.provenance[0].skipped_rows, 1);
    assert_eq!(sales.metrics.total_revenue, Decimal::new(1000, 2));
    assert!(aggregator.refresh(today()).await.is_ok());
}

#[tokio::test]
async fn test_view_unavailable_only_when_every_source_errors() {
    let (aggregator, tables) = setup();
    tables.get("sales_records").unwrap().set_unavailable(true);

    let view = aggregator.sales(today()).await.unwrap();
    assert!(!view.unavailable(), "an empty fallback is not an outage");

    tables.get("export_orders").unwrap().set_unavailable(true);
    let view = aggregator.sales(today()).await.unwrap();
    assert!(view.unavailable());

    // The combined dashboard still renders with an empty sales view
    let metrics = aggregator.refresh(today()).await.unwrap();
    assert!(metrics.sales.products.is_empty());
}

#[tokio::test]
async fn test_overlapping_refreshes_are_independent() {
    let (aggregator, tables) = setup();
    seed(
        &tables,
        "production_reports",
        vec![json!({"product_type": "Yogurt", "raw_material_used": 50, "finished_product": 45, "production_date": "2026-06-14"})],
    )
    .await;

    let (first, second) = tokio::join!(aggregator.refresh(today()), aggregator.refresh(today()));
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn test_fetch_limit_bounds_report_count() {
    let (registry, tables) = SourceRegistry::in_memory(&SourceChains::default()).unwrap();
    let aggregator = MetricsAggregator::new(Arc::new(registry), 3);
    let rows = (1..=6)
        .map(|day| {
            json!({
                "product_type": "Kefir",
                "raw_material_used": 10,
                "finished_product": 9,
                "production_date": format!("2026-06-{:02}", day)
            })
        })
        .collect();
    seed(&tables, "production_reports", rows).await;

    let view = aggregator.production(today()).await.unwrap();
    assert_eq!(view.metrics.report_count, 3);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: grouped totals add up to the overall finished amount
    #[test]
    fn property_group_totals_sum_to_overall(
        batches in prop::collection::vec((0usize..3, 1u32..500, 0u32..500, 1u32..28), 0..10)
    ) {
        let products = ["Cheddar", "Brie", "Gouda"];
        let rows: Vec<Value> = batches
            .iter()
            .map(|(p, raw, finished, day)| json!({
                "product_type": products[*p],
                "raw_material_used": raw,
                "finished_product": finished,
                "production_date": format!("2026-05-{:02}", day)
            }))
            .collect();

        let metrics = tokio_test::block_on(async {
            let (aggregator, tables) = setup();
            seed(&tables, "production_reports", rows).await;
            aggregator.production(today()).await.unwrap().metrics
        });

        let grouped: f64 = metrics.products.iter().map(|p| p.total_finished).sum();
        prop_assert!((grouped - metrics.total_finished).abs() < 1e-6);
        prop_assert!(metrics.products.iter().all(|p| (0.0..=100.0).contains(&p.max_efficiency_percent)));
        prop_assert!(metrics.growth_percent >= 5.0);
    }
}
