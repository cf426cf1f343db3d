//! 预警等级分类器
//!
//! 两套策略并存：
//! - `classify_by_level_score`: 定性级别 -> 0~1 分数，阈值 0.8 / 0.5 / 0.2
//! - `classify_by_coefficient_of_variation`: 直接用变异系数加权，阈值 0.5 / 0.3 / 0.15
//!
//! 两者的输入量纲不同，阈值表也不同，保持为两个独立命名的策略。

use crate::config::WarningConfig;
use crate::models::{HorizonPair, MetricSet, RollingMoments, VolatilityLevel, WarningAssessment};

pub struct WarningClassifier<'a> {
    config: &'a WarningConfig,
}

impl<'a> WarningClassifier<'a> {
    pub fn new(config: &'a WarningConfig) -> Self {
        Self { config }
    }

    pub fn classify_by_level_score(&self, levels: &MetricSet<HorizonPair<VolatilityLevel>>) -> WarningAssessment {
        let scores = &self.config.level_scores;
        let composite = self.blend(levels, |level| scores.score(*level));
        WarningAssessment {
            composite,
            level: self.config.level_thresholds.classify(composite),
        }
    }

    pub fn classify_by_coefficient_of_variation(
        &self,
        moments: &MetricSet<HorizonPair<RollingMoments>>,
    ) -> WarningAssessment {
        let epsilon = self.config.cv_epsilon;
        let composite = self.blend(moments, |m| {
            if m.average <= 0.0 { epsilon } else { m.std_dev / m.average }
        });
        WarningAssessment {
            composite,
            level: self.config.cv_thresholds.classify(composite),
        }
    }

    /// 按指标加权求和，再按 1 日 / 3 日口径混合，结果截断到 [0, 1]。
    fn blend<T>(&self, inputs: &MetricSet<HorizonPair<T>>, score: impl Fn(&T) -> f64) -> f64 {
        let weights = &self.config.weights;
        let (one_day, three_day) = inputs.iter().fold((0.0, 0.0), |(one, three), (metric, pair)| {
            let w = weights.weight(metric);
            (one + w * score(&pair.one_day), three + w * score(&pair.three_day))
        });

        let horizon = &self.config.horizon;
        let composite = horizon.one_day * one_day + horizon.three_day * three_day;
        composite.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WarningLevel;
    use approx::assert_relative_eq;

    fn uniform_levels(level: VolatilityLevel) -> MetricSet<HorizonPair<VolatilityLevel>> {
        MetricSet::from_fn(|_| HorizonPair { one_day: level, three_day: level })
    }

    fn moments(average: f64, std_dev: f64) -> HorizonPair<RollingMoments> {
        let m = RollingMoments { average, std_dev };
        HorizonPair { one_day: m, three_day: m }
    }

    #[test]
    fn test_all_severe_levels_are_severe() {
        let cfg = WarningConfig::default();
        let result = WarningClassifier::new(&cfg).classify_by_level_score(&uniform_levels(VolatilityLevel::Severe));
        assert_relative_eq!(result.composite, 1.0, epsilon = 1e-9);
        assert_eq!(result.level, WarningLevel::Severe);
    }

    #[test]
    fn test_all_minimal_levels_are_normal() {
        let cfg = WarningConfig::default();
        let result = WarningClassifier::new(&cfg).classify_by_level_score(&uniform_levels(VolatilityLevel::Minimal));
        assert_eq!(result.composite, 0.0);
        assert_eq!(result.level, WarningLevel::Normal);
    }

    #[test]
    fn test_all_moderate_levels_are_moderate() {
        let cfg = WarningConfig::default();
        let result = WarningClassifier::new(&cfg).classify_by_level_score(&uniform_levels(VolatilityLevel::Moderate));
        assert_relative_eq!(result.composite, 0.5, epsilon = 1e-9);
        assert_eq!(result.level, WarningLevel::Moderate);
    }

    #[test]
    fn test_level_score_weights_and_horizons() {
        let cfg = WarningConfig::default();
        let levels = MetricSet {
            visitors: HorizonPair { one_day: VolatilityLevel::Severe, three_day: VolatilityLevel::Minimal },
            ad_cost: HorizonPair { one_day: VolatilityLevel::Minimal, three_day: VolatilityLevel::Obvious },
            sales: HorizonPair { one_day: VolatilityLevel::Minimal, three_day: VolatilityLevel::Minimal },
        };
        let result = WarningClassifier::new(&cfg).classify_by_level_score(&levels);
        // one_day = 0.4 * 1.0, three_day = 0.3 * 0.8
        assert_relative_eq!(result.composite, 0.6 * 0.4 + 0.4 * 0.24, epsilon = 1e-9);
        assert_eq!(result.level, WarningLevel::Minor);
    }

    #[test]
    fn test_cv_zero_std_is_normal() {
        let cfg = WarningConfig::default();
        let inputs = MetricSet::from_fn(|_| moments(100.0, 0.0));
        let result = WarningClassifier::new(&cfg).classify_by_coefficient_of_variation(&inputs);
        assert_eq!(result.composite, 0.0);
        assert_eq!(result.level, WarningLevel::Normal);
    }

    #[test]
    fn test_cv_non_positive_average_uses_epsilon() {
        let cfg = WarningConfig::default();
        let inputs = MetricSet::from_fn(|_| moments(0.0, 50.0));
        let result = WarningClassifier::new(&cfg).classify_by_coefficient_of_variation(&inputs);
        assert_relative_eq!(result.composite, 0.001, epsilon = 1e-12);
        assert_eq!(result.level, WarningLevel::Normal);
    }

    #[test]
    fn test_cv_thresholds_differ_from_level_thresholds() {
        let cfg = WarningConfig::default();
        // cv = 0.35 everywhere
        let inputs = MetricSet::from_fn(|_| moments(100.0, 35.0));
        let result = WarningClassifier::new(&cfg).classify_by_coefficient_of_variation(&inputs);
        assert_relative_eq!(result.composite, 0.35, epsilon = 1e-9);
        assert_eq!(result.level, WarningLevel::Moderate);
        assert_eq!(cfg.level_thresholds.classify(result.composite), WarningLevel::Minor);
    }

    #[test]
    fn test_cv_composite_is_clamped() {
        let cfg = WarningConfig::default();
        let inputs = MetricSet::from_fn(|_| moments(10.0, 80.0));
        let result = WarningClassifier::new(&cfg).classify_by_coefficient_of_variation(&inputs);
        assert_eq!(result.composite, 1.0);
        assert_eq!(result.level, WarningLevel::Severe);
    }
}
