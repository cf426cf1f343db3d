//! Integration tests for the volatility engine components

use product_volatility::config::{AnalyticsConfig, LevelThresholds, VolatilityConfig, WarningConfig};
use product_volatility::indicators::{calculate_change_index, SlidingVolatilityCalculator, WarningClassifier};
use product_volatility::models::{
    Direction, HorizonPair, MetricSet, RollingMoments, VolatilityDescriptor, VolatilityLevel, WarningLevel,
};
use product_volatility::stats::{
    calculate_ewma, calculate_rolling_change_rate_index, calculate_rolling_cv, calculate_short_long_mean_ratio,
    calculate_short_term_volatility_vs_long_term_baseline, ChangeRateMethod, DEFAULT_EWMA_PERIOD,
};
use product_volatility::AnalyticsError;

use proptest::prelude::*;

fn noisy_series(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + ((i * 37) % 23) as f64 - 11.0).collect()
}

#[test]
fn test_flat_series_every_window_minimal() {
    let cfg = VolatilityConfig::default();
    let descriptors = SlidingVolatilityCalculator::new(&cfg).calculate(&[100.0; 60]);

    assert_eq!(descriptors.len(), 5);
    for (d, window) in descriptors.iter().zip([1, 3, 7, 15, 30]) {
        assert_eq!(d.window, window);
        assert_eq!(d.level, VolatilityLevel::Minimal);
        assert_eq!(d.strength, 0.0);
    }
}

#[test]
fn test_fewer_than_two_valid_values_all_neutral() {
    let cfg = VolatilityConfig::default();
    let calc = SlidingVolatilityCalculator::new(&cfg);
    let descriptors = calc.calculate(&[0.0, 0.0, 12.0, -3.0]);
    let expected: Vec<VolatilityDescriptor> =
        [1, 3, 7, 15, 30].into_iter().map(VolatilityDescriptor::neutral).collect();
    assert_eq!(descriptors, expected);
}

#[test]
fn test_strength_is_rounded_to_two_decimals() {
    let cfg = VolatilityConfig::default();
    let descriptors = SlidingVolatilityCalculator::new(&cfg).calculate(&noisy_series(60));
    for d in descriptors {
        assert_eq!(d.strength, (d.strength * 100.0).round() / 100.0);
    }
}

#[test]
fn test_single_spike_change_index() {
    let mut series = vec![50.0; 59];
    series.push(500.0);
    let ci = calculate_change_index(&series, &LevelThresholds::default()).unwrap();
    assert_eq!(ci.direction, Direction::Up);
    assert_eq!(ci.strength, 100.0);
    assert_eq!(ci.level, VolatilityLevel::Severe);
}

#[test]
fn test_cumulative_change_rate_of_flat_week_is_zero() {
    let out = calculate_rolling_change_rate_index(&[10.0; 7], 7, ChangeRateMethod::Cumulative);
    assert_eq!(out.last().copied().flatten(), Some(0.0));
}

#[test]
fn test_all_moderate_levels_composite_half() {
    let cfg = WarningConfig::default();
    let levels = MetricSet::from_fn(|_| HorizonPair {
        one_day: VolatilityLevel::Moderate,
        three_day: VolatilityLevel::Moderate,
    });
    let result = WarningClassifier::new(&cfg).classify_by_level_score(&levels);
    assert!((result.composite - 0.5).abs() < 1e-9);
    assert_eq!(result.level, WarningLevel::Moderate);
}

#[test]
fn test_cv_policy_with_zero_std_is_normal() {
    let cfg = WarningConfig::default();
    let m = RollingMoments { average: 250.0, std_dev: 0.0 };
    let inputs = MetricSet::from_fn(|_| HorizonPair { one_day: m, three_day: m });
    let result = WarningClassifier::new(&cfg).classify_by_coefficient_of_variation(&inputs);
    assert_eq!(result.composite, 0.0);
    assert_eq!(result.level, WarningLevel::Normal);
}

#[test]
fn test_alternate_policy_is_injectable() {
    let cfg = WarningConfig {
        level_thresholds: product_volatility::config::WarningThresholds { severe: 0.4, moderate: 0.3, minor: 0.1 },
        ..WarningConfig::default()
    };
    let levels = MetricSet::from_fn(|_| HorizonPair {
        one_day: VolatilityLevel::Moderate,
        three_day: VolatilityLevel::Moderate,
    });
    let result = WarningClassifier::new(&cfg).classify_by_level_score(&levels);
    assert_eq!(result.level, WarningLevel::Severe);
}

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml");
    let cfg = AnalyticsConfig::load(path).unwrap();
    assert_eq!(cfg, AnalyticsConfig::default());
}

#[test]
fn test_programming_errors_fail_loudly() {
    let data = noisy_series(40);
    assert!(matches!(
        calculate_short_long_mean_ratio(&data, 30, 7),
        Err(AnalyticsError::InvalidWindow { short: 30, long: 7 })
    ));
    assert!(calculate_short_term_volatility_vs_long_term_baseline(&data, 7, 7, true).is_err());
    assert!(matches!(
        calculate_ewma(&data, Some(0.0), DEFAULT_EWMA_PERIOD),
        Err(AnalyticsError::InvalidAlpha(_))
    ));
}

proptest! {
    #[test]
    fn prop_sliding_strength_bounded(values in prop::collection::vec(0.01f64..10_000.0, 1..120)) {
        let cfg = VolatilityConfig::default();
        let descriptors = SlidingVolatilityCalculator::new(&cfg).calculate(&values);
        prop_assert_eq!(descriptors.len(), 5);
        for d in descriptors {
            prop_assert!((0.0..=100.0).contains(&d.strength));
        }
    }

    #[test]
    fn prop_change_index_strength_bounded(values in prop::collection::vec(-100.0f64..10_000.0, 0..120)) {
        if let Some(ci) = calculate_change_index(&values, &LevelThresholds::default()) {
            prop_assert!((0.0..=100.0).contains(&ci.strength));
        }
    }

    #[test]
    fn prop_increasing_series_points_up(start in 1.0f64..1000.0, steps in prop::collection::vec(0.1f64..50.0, 1..60)) {
        let mut series = vec![start];
        for step in steps {
            let next = series[series.len() - 1] + step;
            series.push(next);
        }
        let ci = calculate_change_index(&series, &LevelThresholds::default()).unwrap();
        prop_assert_eq!(ci.direction, Direction::Up);

        series.reverse();
        let ci = calculate_change_index(&series, &LevelThresholds::default()).unwrap();
        prop_assert_eq!(ci.direction, Direction::Down);
    }

    #[test]
    fn prop_rolling_cv_leading_nones(values in prop::collection::vec(1.0f64..500.0, 0..60), window in 1usize..40) {
        let out = calculate_rolling_cv(&values, window, true);
        prop_assert_eq!(out.len(), values.len());
        let leading = out.iter().take_while(|v| v.is_none()).count();
        if window <= values.len() {
            prop_assert_eq!(leading, window - 1);
        } else {
            prop_assert_eq!(leading, values.len());
        }
    }

    #[test]
    fn prop_ewma_starts_at_first_value(values in prop::collection::vec(-1e6f64..1e6, 1..100)) {
        let out = calculate_ewma(&values, None, DEFAULT_EWMA_PERIOD).unwrap();
        prop_assert_eq!(out[0], values[0]);
        prop_assert_eq!(out.len(), values.len());
    }

    #[test]
    fn prop_level_composite_within_unit_interval(levels in prop::collection::vec(0usize..5, 6)) {
        const ALL: [VolatilityLevel; 5] = [
            VolatilityLevel::Minimal,
            VolatilityLevel::Slight,
            VolatilityLevel::Moderate,
            VolatilityLevel::Obvious,
            VolatilityLevel::Severe,
        ];
        let pair = |i: usize| HorizonPair { one_day: ALL[levels[i]], three_day: ALL[levels[i + 1]] };
        let inputs = MetricSet { visitors: pair(0), ad_cost: pair(2), sales: pair(4) };
        let cfg = WarningConfig::default();
        let result = WarningClassifier::new(&cfg).classify_by_level_score(&inputs);
        prop_assert!((0.0..=1.0).contains(&result.composite));
    }
}
