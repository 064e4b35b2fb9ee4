//! Projection arithmetic for dashboard metrics
//!
//! Everything here is pure. Malformed input (non-finite numbers, zero
//! denominators) never fails: each function falls back to the documented
//! default or sentinel so one bad row cannot block the rest of a dashboard.

use chrono::NaiveDate;

use crate::models::{CompletionEstimate, ProductionRecord, QualityRecord, DEFAULT_QUALITY_SCORE};

/// Below this many days in the program the measured gain is not trusted
pub const MIN_HISTORY_DAYS: i64 = 7;
/// kg/day reported while history is too short
pub const DEFAULT_DAILY_GAIN: f64 = 0.7;
/// Measured gains outside this band are treated as scale noise
pub const MIN_DAILY_GAIN: f64 = 0.2;
pub const MAX_DAILY_GAIN: f64 = 2.0;
/// Above this share of target weight, gains slow down
pub const NEAR_TARGET_RATIO: f64 = 0.8;
pub const NEAR_TARGET_SLOWDOWN: f64 = 1.15;
/// Growth never reported below this
pub const GROWTH_FLOOR_PERCENT: f64 = 5.0;
/// Growth reported when the earlier period had nothing
pub const GROWTH_FROM_ZERO_PERCENT: f64 = 100.0;

/// Whole days between entry and `today`
pub fn days_in_program(entry_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - entry_date).num_days()
}

/// Average kg/day gained since entering the program
pub fn daily_gain(
    entry_weight: f64,
    current_weight: f64,
    entry_date: NaiveDate,
    today: NaiveDate,
) -> f64 {
    let days = days_in_program(entry_date, today);
    if days < MIN_HISTORY_DAYS {
        return DEFAULT_DAILY_GAIN;
    }
    clamp_daily_gain((current_weight - entry_weight) / days as f64)
}

/// Force a gain into the accepted band; non-finite gains become the default
pub fn clamp_daily_gain(gain: f64) -> f64 {
    if gain.is_finite() {
        gain.clamp(MIN_DAILY_GAIN, MAX_DAILY_GAIN)
    } else {
        DEFAULT_DAILY_GAIN
    }
}

/// Project when an animal reaches its target weight
pub fn estimated_completion(
    current_weight: f64,
    target_weight: f64,
    daily_gain: f64,
    today: NaiveDate,
) -> CompletionEstimate {
    if !current_weight.is_finite() || !target_weight.is_finite() {
        return CompletionEstimate::NotAvailable;
    }
    if current_weight >= target_weight {
        return CompletionEstimate::ReadyNow;
    }
    if !daily_gain.is_finite() || daily_gain <= 0.0 {
        return CompletionEstimate::NotAvailable;
    }

    let mut days = ((target_weight - current_weight) / daily_gain).ceil();
    if target_weight > 0.0 && current_weight / target_weight > NEAR_TARGET_RATIO {
        days = (days * NEAR_TARGET_SLOWDOWN).round();
    }

    if !days.is_finite() || days > u32::MAX as f64 {
        return CompletionEstimate::NotAvailable;
    }
    CompletionEstimate::projected_in(today, days as u64)
}

/// Finished output as a whole-number percentage of raw input, within 0-100
pub fn efficiency_percent(finished_amount: f64, raw_material_used: f64) -> f64 {
    if !raw_material_used.is_finite() || raw_material_used == 0.0 || !finished_amount.is_finite() {
        return 0.0;
    }
    (finished_amount / raw_material_used * 100.0)
        .round()
        .clamp(0.0, 100.0)
}

/// Share of passed checks as a whole-number percentage
pub fn checklist_score(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 / total as f64 * 100.0).round()
}

/// Growth of the later half of a series over the earlier half
///
/// Records are ordered by date and split at the midpoint; with an odd count
/// the later half takes the extra record. The result is floored at
/// [`GROWTH_FLOOR_PERCENT`].
pub fn period_growth_percent<T, D, Y>(records: &[T], date_of: D, yield_of: Y) -> f64
where
    D: Fn(&T) -> NaiveDate,
    Y: Fn(&T) -> f64,
{
    let mut ordered: Vec<&T> = records.iter().collect();
    ordered.sort_by_key(|record| date_of(record));

    let (earlier, later) = ordered.split_at(ordered.len() / 2);
    let sum = |half: &[&T]| -> f64 {
        half.iter()
            .map(|record| yield_of(record))
            .filter(|value| value.is_finite())
            .sum()
    };
    let earlier_sum = sum(earlier);
    let later_sum = sum(later);

    if earlier_sum == 0.0 {
        return if later_sum != 0.0 {
            GROWTH_FROM_ZERO_PERCENT
        } else {
            GROWTH_FLOOR_PERCENT
        };
    }

    let growth = (later_sum - earlier_sum) / earlier_sum * 100.0;
    if growth.is_finite() && growth > 0.0 {
        growth
    } else {
        GROWTH_FLOOR_PERCENT
    }
}

/// Dashboard quality score: dedicated quality records first, then production scores
pub fn average_quality_score(quality: &[QualityRecord], production: &[ProductionRecord]) -> f64 {
    if let Some(mean) = mean(quality.iter().map(|q| q.average_quality)) {
        return mean;
    }
    mean(production.iter().map(|p| p.quality_score)).unwrap_or(DEFAULT_QUALITY_SCORE)
}

/// Arithmetic mean of the finite values, `None` when there are none
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualityOrigin;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 6, 15)
    }

    fn production(product: &str, finished: f64, quality: f64, day: u32) -> ProductionRecord {
        ProductionRecord {
            source_key: None,
            product_type: product.to_string(),
            raw_material_used: 100.0,
            finished_amount: finished,
            efficiency_percent: finished,
            quality_score: quality,
            production_date: date(2026, 6, day),
        }
    }

    fn quality(score: f64) -> QualityRecord {
        QualityRecord {
            source_key: None,
            date: today(),
            average_quality: score,
            volume: 10.0,
            origin: QualityOrigin::Checklist,
        }
    }

    // ========================================================================
    // Daily gain
    // ========================================================================

    #[test]
    fn test_daily_gain_ten_days() {
        let entry = today() - chrono::Duration::days(10);
        let gain = daily_gain(300.0, 306.0, entry, today());
        assert!((gain - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_daily_gain_short_history_uses_default() {
        let entry = today() - chrono::Duration::days(6);
        assert_eq!(daily_gain(300.0, 400.0, entry, today()), DEFAULT_DAILY_GAIN);
    }

    #[test]
    fn test_daily_gain_clamps_noise() {
        let entry = today() - chrono::Duration::days(10);
        assert_eq!(daily_gain(300.0, 350.0, entry, today()), MAX_DAILY_GAIN);
        assert_eq!(daily_gain(300.0, 290.0, entry, today()), MIN_DAILY_GAIN);
    }

    #[test]
    fn test_daily_gain_non_finite_weight() {
        let entry = today() - chrono::Duration::days(30);
        assert_eq!(daily_gain(f64::NAN, 400.0, entry, today()), DEFAULT_DAILY_GAIN);
    }

    // ========================================================================
    // Completion estimate
    // ========================================================================

    #[test]
    fn test_completion_ready_now() {
        assert_eq!(
            estimated_completion(100.0, 100.0, 0.8, today()),
            CompletionEstimate::ReadyNow
        );
        assert_eq!(
            estimated_completion(520.0, 500.0, 0.8, today()),
            CompletionEstimate::ReadyNow
        );
    }

    #[test]
    fn test_completion_ready_now_ignores_unusable_gain() {
        assert_eq!(
            estimated_completion(100.0, 100.0, f64::NAN, today()),
            CompletionEstimate::ReadyNow
        );
        assert_eq!(
            estimated_completion(510.0, 500.0, f64::INFINITY, today()),
            CompletionEstimate::ReadyNow
        );
        assert_eq!(
            estimated_completion(50.0, 100.0, f64::NAN, today()),
            CompletionEstimate::NotAvailable
        );
    }

    #[test]
    fn test_completion_not_available() {
        assert_eq!(
            estimated_completion(50.0, 100.0, 0.0, today()),
            CompletionEstimate::NotAvailable
        );
        assert_eq!(
            estimated_completion(f64::NAN, 100.0, 0.5, today()),
            CompletionEstimate::NotAvailable
        );
        assert_eq!(
            estimated_completion(50.0, 100.0, -0.3, today()),
            CompletionEstimate::NotAvailable
        );
    }

    #[test]
    fn test_completion_near_target_is_inflated() {
        // 380 of 400 kg: 95% of target, 20 kg left at 0.5 kg/day
        let estimate = estimated_completion(380.0, 400.0, 0.5, today());
        assert_eq!(estimate.days_from(today()), Some(46));
    }

    #[test]
    fn test_completion_far_from_target_is_not_inflated() {
        // 200 of 400 kg at 1.0 kg/day
        let estimate = estimated_completion(200.0, 400.0, 1.0, today());
        assert_eq!(estimate.days_from(today()), Some(200));
    }

    #[test]
    fn test_completion_rounds_partial_days_up() {
        let estimate = estimated_completion(100.0, 400.0, 0.7, today());
        // 300 / 0.7 = 428.57
        assert_eq!(estimate.days_from(today()), Some(429));
    }

    #[test]
    fn test_completion_tiny_gain_does_not_overflow() {
        let estimate = estimated_completion(10.0, 1.0e12, 1.0e-9, today());
        assert_eq!(estimate, CompletionEstimate::NotAvailable);
    }

    // ========================================================================
    // Efficiency and checklist
    // ========================================================================

    #[test]
    fn test_efficiency_percent() {
        assert_eq!(efficiency_percent(80.0, 100.0), 80.0);
        assert_eq!(efficiency_percent(186.0, 1000.0), 19.0);
        assert_eq!(efficiency_percent(80.0, 0.0), 0.0);
        assert_eq!(efficiency_percent(150.0, 100.0), 100.0);
        assert_eq!(efficiency_percent(80.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_checklist_score() {
        assert_eq!(checklist_score(6, 6), 100.0);
        assert_eq!(checklist_score(5, 6), 83.0);
        assert_eq!(checklist_score(0, 6), 0.0);
        assert_eq!(checklist_score(0, 0), 0.0);
    }

    // ========================================================================
    // Period growth
    // ========================================================================

    #[test]
    fn test_growth_between_halves() {
        let records = vec![
            production("Cheddar", 100.0, 85.0, 4),
            production("Cheddar", 150.0, 85.0, 1),
            production("Gouda", 50.0, 85.0, 2),
            production("Gouda", 200.0, 85.0, 3),
        ];
        // earlier: days 1-2 = 200, later: days 3-4 = 300
        let growth = period_growth_percent(&records, |r| r.production_date, |r| r.finished_amount);
        assert!((growth - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_decline_is_floored() {
        let records = vec![
            production("Cheddar", 300.0, 85.0, 1),
            production("Cheddar", 100.0, 85.0, 2),
        ];
        let growth = period_growth_percent(&records, |r| r.production_date, |r| r.finished_amount);
        assert_eq!(growth, GROWTH_FLOOR_PERCENT);
    }

    #[test]
    fn test_growth_from_zero() {
        let records = vec![
            production("Cheddar", 0.0, 85.0, 1),
            production("Cheddar", 10.0, 85.0, 2),
        ];
        let growth = period_growth_percent(&records, |r| r.production_date, |r| r.finished_amount);
        assert_eq!(growth, GROWTH_FROM_ZERO_PERCENT);

        let empty: Vec<ProductionRecord> = Vec::new();
        let growth = period_growth_percent(&empty, |r| r.production_date, |r| r.finished_amount);
        assert_eq!(growth, GROWTH_FLOOR_PERCENT);
    }

    #[test]
    fn test_growth_single_record_lands_in_later_half() {
        let records = vec![production("Cheddar", 40.0, 85.0, 1)];
        let growth = period_growth_percent(&records, |r| r.production_date, |r| r.finished_amount);
        assert_eq!(growth, GROWTH_FROM_ZERO_PERCENT);
    }

    // ========================================================================
    // Average quality
    // ========================================================================

    #[test]
    fn test_average_quality_prefers_quality_records() {
        let production_rows = vec![production("Cheddar", 80.0, 60.0, 1)];
        let quality_rows = vec![quality(90.0), quality(70.0)];
        assert_eq!(average_quality_score(&quality_rows, &production_rows), 80.0);
    }

    #[test]
    fn test_average_quality_falls_back_to_production() {
        let production_rows = vec![
            production("Cheddar", 80.0, 60.0, 1),
            production("Gouda", 80.0, 90.0, 2),
        ];
        assert_eq!(average_quality_score(&[], &production_rows), 75.0);
    }

    #[test]
    fn test_average_quality_default() {
        assert_eq!(average_quality_score(&[], &[]), DEFAULT_QUALITY_SCORE);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn property_daily_gain_within_band(
            entry in 50.0f64..900.0,
            current in 50.0f64..1200.0,
            days in 0i64..1000,
        ) {
            let entry_date = today() - chrono::Duration::days(days);
            let gain = daily_gain(entry, current, entry_date, today());
            if days < MIN_HISTORY_DAYS {
                prop_assert_eq!(gain, DEFAULT_DAILY_GAIN);
            } else {
                prop_assert!((MIN_DAILY_GAIN..=MAX_DAILY_GAIN).contains(&gain));
            }
        }

        #[test]
        fn property_efficiency_zero_raw_is_zero(finished in -1.0e6f64..1.0e6) {
            prop_assert_eq!(efficiency_percent(finished, 0.0), 0.0);
        }

        #[test]
        fn property_growth_never_below_floor(
            yields in proptest::collection::vec(0.0f64..1000.0, 0..20),
        ) {
            let records: Vec<ProductionRecord> = yields
                .iter()
                .enumerate()
                .map(|(i, y)| production("Milk", *y, 85.0, (i % 28) as u32 + 1))
                .collect();
            let growth = period_growth_percent(&records, |r| r.production_date, |r| r.finished_amount);
            prop_assert!(growth >= GROWTH_FLOOR_PERCENT);
        }
    }
}
