use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{AnalyticsError, Result};
use crate::models::{Metric, VolatilityLevel, WarningLevel};

/// 波动强度分级阈值 (上界不含)
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LevelThresholds {
    pub minimal: f64,
    pub slight: f64,
    pub moderate: f64,
    pub obvious: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self { minimal: 10.0, slight: 30.0, moderate: 60.0, obvious: 80.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct VolatilityConfig {
    pub windows: Vec<usize>,
    pub long_window: usize,
    pub calm_zone_low: f64,
    pub calm_zone_high: f64,
    pub calm_penalty: f64,
    pub levels: LevelThresholds,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            windows: vec![1, 3, 7, 15, 30],
            long_window: 60,
            calm_zone_low: 0.8,
            calm_zone_high: 1.2,
            calm_penalty: 20.0,
            levels: LevelThresholds::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricWeights {
    pub visitors: f64,
    pub ad_cost: f64,
    pub sales: f64,
}

impl MetricWeights {
    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Visitors => self.visitors,
            Metric::AdCost => self.ad_cost,
            Metric::Sales => self.sales,
        }
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self { visitors: 0.4, ad_cost: 0.3, sales: 0.3 }
    }
}

/// 1 日 / 3 日口径的混合权重
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HorizonBlend {
    pub one_day: f64,
    pub three_day: f64,
}

impl Default for HorizonBlend {
    fn default() -> Self {
        Self { one_day: 0.6, three_day: 0.4 }
    }
}

/// 综合评分到预警等级的阈值 (下界含)
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WarningThresholds {
    pub severe: f64,
    pub moderate: f64,
    pub minor: f64,
}

impl WarningThresholds {
    /// 定性级别打分策略使用的阈值表
    pub fn level_score() -> Self {
        Self { severe: 0.8, moderate: 0.5, minor: 0.2 }
    }

    /// 变异系数策略使用的阈值表
    pub fn coefficient_of_variation() -> Self {
        Self { severe: 0.5, moderate: 0.3, minor: 0.15 }
    }

    /// 任意实数都落入且仅落入一个等级，NaN 视为正常。
    pub fn classify(&self, score: f64) -> WarningLevel {
        if score >= self.severe {
            WarningLevel::Severe
        } else if score >= self.moderate {
            WarningLevel::Moderate
        } else if score >= self.minor {
            WarningLevel::Minor
        } else {
            WarningLevel::Normal
        }
    }
}

/// 定性级别到 0~1 分数的映射
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LevelScores {
    pub minimal: f64,
    pub slight: f64,
    pub moderate: f64,
    pub obvious: f64,
    pub severe: f64,
}

impl LevelScores {
    pub fn score(&self, level: VolatilityLevel) -> f64 {
        match level {
            VolatilityLevel::Minimal => self.minimal,
            VolatilityLevel::Slight => self.slight,
            VolatilityLevel::Moderate => self.moderate,
            VolatilityLevel::Obvious => self.obvious,
            VolatilityLevel::Severe => self.severe,
        }
    }
}

impl Default for LevelScores {
    fn default() -> Self {
        Self { minimal: 0.0, slight: 0.2, moderate: 0.5, obvious: 0.8, severe: 1.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WarningConfig {
    pub weights: MetricWeights,
    pub horizon: HorizonBlend,
    pub level_scores: LevelScores,
    pub level_thresholds: WarningThresholds,
    pub cv_thresholds: WarningThresholds,
    /// 均值不为正时代替 CV 的极小值
    pub cv_epsilon: f64,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            weights: MetricWeights::default(),
            horizon: HorizonBlend::default(),
            level_scores: LevelScores::default(),
            level_thresholds: WarningThresholds::level_score(),
            cv_thresholds: WarningThresholds::coefficient_of_variation(),
            cv_epsilon: 0.001,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistogramConfig {
    pub step: f64,
    pub buckets: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { step: 0.05, buckets: 20 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 以参考日期为终点向前回看的天数
    pub lookback_days: u32,
    /// 时间维度，需包含 1 与 3
    pub dimensions: Vec<usize>,
    pub volatility: VolatilityConfig,
    pub warning: WarningConfig,
    pub histogram: HistogramConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 60,
            dimensions: vec![30, 15, 7, 3, 1],
            volatility: VolatilityConfig::default(),
            warning: WarningConfig::default(),
            histogram: HistogramConfig::default(),
        }
    }
}

const WEIGHT_TOLERANCE: f64 = 1e-6;
/// 回看上限，约十年
pub const MAX_LOOKBACK_DAYS: u32 = 3660;

impl AnalyticsConfig {
    /// Loads and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path).map_err(|e| {
            AnalyticsError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml_content)
    }

    /// Parses a YAML document; missing sections fall back to the built-in tables.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(AnalyticsError::Config(format!(
                "lookback_days must be in 1..={}, got {}",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        if !self.dimensions.contains(&1) || !self.dimensions.contains(&3) {
            return Err(AnalyticsError::Config("dimensions must include 1 and 3".into()));
        }
        if self.dimensions.contains(&0) {
            return Err(AnalyticsError::Config("dimensions must be positive".into()));
        }

        let vol = &self.volatility;
        if vol.windows.is_empty() {
            return Err(AnalyticsError::Config("volatility.windows is empty".into()));
        }
        if let Some(&w) = vol.windows.iter().find(|&&w| w == 0 || w >= vol.long_window) {
            return Err(AnalyticsError::Config(format!(
                "volatility window {} must be in 1..{}",
                w, vol.long_window
            )));
        }
        if vol.calm_zone_low > vol.calm_zone_high {
            return Err(AnalyticsError::Config("calm zone bounds are reversed".into()));
        }
        if vol.calm_penalty < 0.0 {
            return Err(AnalyticsError::Config("calm_penalty must not be negative".into()));
        }
        let l = &vol.levels;
        if !(l.minimal < l.slight && l.slight < l.moderate && l.moderate < l.obvious) {
            return Err(AnalyticsError::Config("level thresholds must be strictly increasing".into()));
        }

        let w = &self.warning;
        check_weights("warning.weights", &[w.weights.visitors, w.weights.ad_cost, w.weights.sales])?;
        check_weights("warning.horizon", &[w.horizon.one_day, w.horizon.three_day])?;
        check_tiers("warning.level_thresholds", &w.level_thresholds)?;
        check_tiers("warning.cv_thresholds", &w.cv_thresholds)?;
        if w.cv_epsilon <= 0.0 {
            return Err(AnalyticsError::Config("warning.cv_epsilon must be positive".into()));
        }

        if self.histogram.step <= 0.0 || self.histogram.buckets == 0 {
            return Err(AnalyticsError::Config("histogram step and buckets must be positive".into()));
        }

        Ok(())
    }
}

fn check_weights(name: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| *w < 0.0) {
        return Err(AnalyticsError::Config(format!("{} contains a negative weight", name)));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AnalyticsError::Config(format!("{} must sum to 1, got {}", name, sum)));
    }
    Ok(())
}

fn check_tiers(name: &str, t: &WarningThresholds) -> Result<()> {
    if !(t.severe > t.moderate && t.moderate > t.minor) {
        return Err(AnalyticsError::Config(format!("{} must be strictly decreasing", name)));
    }
    Ok(())
}
