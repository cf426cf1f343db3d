//! 滑动波动率计算器
//!
//! 对单个指标的日序列，按每个短窗口 (默认 1/3/7/15/30 天) 与长基线 (默认 60 天)
//! 的标准差比值，给出方向、强度与定性级别。

use tracing::debug;

use crate::config::VolatilityConfig;
use crate::models::{Direction, VolatilityDescriptor, VolatilityLevel, VolatilityResult};
use crate::stats::{calculate_short_term_volatility_vs_long_term_baseline, mean};

/// 比值达到该值即视为满强度
const FULL_STRENGTH_RATIO: f64 = 2.0;

pub struct SlidingVolatilityCalculator<'a> {
    config: &'a VolatilityConfig,
}

impl<'a> SlidingVolatilityCalculator<'a> {
    /// 配置通常已由 `AnalyticsConfig::validate` 校验；未校验时，0 窗口与不小于基线的窗口按样本不足处理。
    pub fn new(config: &'a VolatilityConfig) -> Self {
        Self { config }
    }

    /// 每个请求窗口返回一个结果，顺序与配置一致。
    pub fn evaluate(&self, values: &[f64]) -> Vec<VolatilityResult> {
        // 非正值是上游的占位数据
        let valid: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();

        if valid.len() < 2 {
            debug!(valid = valid.len(), "not enough positive samples, all windows neutral");
            return self
                .config
                .windows
                .iter()
                .map(|&window| VolatilityResult::InsufficientData { window })
                .collect();
        }

        self.config
            .windows
            .iter()
            .map(|&window| self.evaluate_window(&valid, window))
            .collect()
    }

    /// 输出边界：折叠为描述对象并统一四舍五入。
    pub fn calculate(&self, values: &[f64]) -> Vec<VolatilityDescriptor> {
        self.evaluate(values)
            .into_iter()
            .map(VolatilityResult::into_descriptor)
            .collect()
    }

    fn evaluate_window(&self, valid: &[f64], window: usize) -> VolatilityResult {
        let n = valid.len();
        let short = window.min(n);
        if short == 0 || short >= n {
            return VolatilityResult::InsufficientData { window };
        }
        let long = self.config.long_window.min(n);
        if long <= short {
            return VolatilityResult::InsufficientData { window };
        }

        // short < long 已在上面保证
        let last_ratio = calculate_short_term_volatility_vs_long_term_baseline(valid, short, long, true)
            .ok()
            .and_then(|ratios| ratios.last().copied().flatten());
        let ratio = match last_ratio {
            Some(r) => r,
            None => return VolatilityResult::FlatBaseline { window },
        };

        let short_mean = mean(&valid[n - short..]);
        let long_mean = mean(&valid[n - long..]);
        let direction = if short_mean >= long_mean { Direction::Up } else { Direction::Down };

        let strength = self.strength_from_ratio(ratio);
        let level = VolatilityLevel::from_strength(strength, &self.config.levels);

        debug!(window, short, long, ratio, strength, ?level, "sliding volatility");

        VolatilityResult::Computed(VolatilityDescriptor { window, direction, strength, level })
    }

    /// 比值映射到 0~100；落在平稳区间 (默认 0.8~1.2) 时再扣减固定强度。
    fn strength_from_ratio(&self, ratio: f64) -> f64 {
        let mut strength = if ratio <= 0.0 {
            0.0
        } else if ratio >= FULL_STRENGTH_RATIO {
            100.0
        } else {
            (ratio / FULL_STRENGTH_RATIO * 100.0).min(100.0)
        };

        if ratio >= self.config.calm_zone_low && ratio <= self.config.calm_zone_high {
            strength = (strength - self.config.calm_penalty).max(0.0);
        }

        strength.clamp(0.0, 100.0)
    }
}
