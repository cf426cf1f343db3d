// src/lib.rs

pub mod config;
pub mod distribution;
pub mod error;
pub mod indicators;
pub mod messages;
pub mod models;
pub mod series;
pub mod stats;

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::distribution::CompositeDistribution;
use crate::indicators::{calculate_change_index, time_dimension_profile, SlidingVolatilityCalculator, WarningClassifier};
use crate::models::{
    ChangeIndex, HorizonPair, MetricAnalysis, MetricSet, ProductReport, ProductSeries, RollingMoments,
    TimeDimensionProfile, WarningLevel,
};

pub use crate::error::{AnalyticsError, Result};

/// Result of analyzing a batch of products.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub products: Vec<ProductReport>,
    /// Product count per tier (worst of the two policies), every tier present.
    pub tiers: BTreeMap<WarningLevel, usize>,
    pub distribution: CompositeDistribution,
}

/// Runs the full volatility pipeline for one product.
///
/// Records are aligned onto the `lookback_days` window ending at `end_date`; each metric
/// then gets its sliding descriptors, whole-window change index and time-dimension profile,
/// and the 1-day / 3-day entries of the profiles feed both warning policies.
pub fn analyze_product(product: &ProductSeries, cfg: &AnalyticsConfig) -> ProductReport {
    let aligned = series::align_daily(&product.records, product.end_date, cfg.lookback_days);
    let levels = &cfg.volatility.levels;
    let sliding = SlidingVolatilityCalculator::new(&cfg.volatility);

    let profiles = MetricSet::from_fn(|metric| time_dimension_profile(aligned.metric(metric), &cfg.dimensions, levels));
    let horizons = profiles.map(|metric, profile| {
        horizon_profiles(profile).unwrap_or_else(|| {
            warn!(product = %product.product_id, ?metric, "1-day / 3-day dimensions missing, using neutral inputs");
            let neutral = neutral_profile();
            HorizonPair { one_day: neutral, three_day: neutral }
        })
    });

    let classifier = WarningClassifier::new(&cfg.warning);
    let level_warning = classifier.classify_by_level_score(&horizons.map(|_, h| HorizonPair {
        one_day: h.one_day.change_index.level,
        three_day: h.three_day.change_index.level,
    }));
    let cv_warning = classifier.classify_by_coefficient_of_variation(&horizons.map(|_, h| HorizonPair {
        one_day: h.one_day.moments,
        three_day: h.three_day.moments,
    }));

    let metrics = profiles.map(|metric, profile| {
        let values = aligned.metric(metric);
        let change_index = calculate_change_index(values, levels)
            .unwrap_or_else(ChangeIndex::neutral)
            .rounded();

        debug!(
            product = %product.product_id,
            ?metric,
            valid = values.iter().filter(|v| **v > 0.0).count(),
            strength = change_index.strength,
            level = change_index.level.label(),
            "metric analyzed"
        );

        MetricAnalysis {
            sliding: sliding.calculate(values),
            change_index,
            dimensions: profile
                .iter()
                .map(|p| TimeDimensionProfile { change_index: p.change_index.rounded(), ..*p })
                .collect(),
            message: messages::change_index_message(metric, &change_index),
        }
    });

    let mut report = ProductReport {
        product_id: product.product_id.clone(),
        reference_date: product.end_date,
        metrics,
        level_warning,
        cv_warning,
        alert: String::new(),
    };
    report.alert = messages::product_alert(&report);

    if report.worst_level() == WarningLevel::Severe {
        warn!(
            "🔥 Severe volatility on product {} | level score: {:.2} | CV score: {:.2}",
            report.product_id, level_warning.composite, cv_warning.composite
        );
    }

    report
}

/// Analyzes every product and aggregates tier counts and the composite-score histogram.
pub fn analyze_batch(products: &[ProductSeries], cfg: &AnalyticsConfig) -> BatchReport {
    let mut tiers: BTreeMap<WarningLevel, usize> = [
        WarningLevel::Normal,
        WarningLevel::Minor,
        WarningLevel::Moderate,
        WarningLevel::Severe,
    ]
    .into_iter()
    .map(|level| (level, 0))
    .collect();
    let mut distribution = CompositeDistribution::new(
        cfg.histogram.step,
        cfg.histogram.buckets,
        cfg.warning.level_thresholds.clone(),
    );

    let reports: Vec<ProductReport> = products
        .iter()
        .map(|product| {
            let report = analyze_product(product, cfg);
            *tiers.entry(report.worst_level()).or_insert(0) += 1;
            distribution.record(report.level_warning.composite);
            report
        })
        .collect();

    info!(
        "📊 Analyzed {} products | 正常: {} 轻微: {} 一般: {} 严重: {}",
        reports.len(),
        tiers[&WarningLevel::Normal],
        tiers[&WarningLevel::Minor],
        tiers[&WarningLevel::Moderate],
        tiers[&WarningLevel::Severe],
    );

    BatchReport { products: reports, tiers, distribution }
}

fn horizon_profiles(profile: &[TimeDimensionProfile]) -> Option<HorizonPair<TimeDimensionProfile>> {
    let dimensions: Vec<usize> = profile.iter().map(|p| p.dimension).collect();
    HorizonPair::from_dimensions(profile, &dimensions)
}

fn neutral_profile() -> TimeDimensionProfile {
    TimeDimensionProfile {
        dimension: 0,
        change_index: ChangeIndex::neutral(),
        moments: RollingMoments { average: 0.0, std_dev: 0.0 },
    }
}
