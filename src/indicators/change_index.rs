//! 变化指数计算器
//!
//! 以整段序列逐日变化率的振幅 (最大值 - 最小值) 衡量波动，
//! 用于 1 日 / 3 日预警评分这种每个指标只需要一个严重度的场景。

use crate::config::LevelThresholds;
use crate::models::{ChangeIndex, Direction, RollingMoments, TimeDimensionProfile, VolatilityLevel};
use crate::stats::{mean, rolling_mean, standard_deviation};

/// 返回 `None` 表示有效样本不足，由调用方在输出边界换成 `ChangeIndex::neutral()`。
pub fn calculate_change_index(values: &[f64], thresholds: &LevelThresholds) -> Option<ChangeIndex> {
    if values.len() < 2 {
        return None;
    }
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.len() < 2 {
        return None;
    }

    let daily_rates: Vec<f64> = positive
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    if daily_rates.is_empty() {
        return None;
    }

    let direction = Direction::from_sign(mean(&daily_rates));

    let max = daily_rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = daily_rates.iter().copied().fold(f64::INFINITY, f64::min);
    let strength = ((max - min) * 100.0).clamp(0.0, 100.0);

    Some(ChangeIndex {
        direction,
        strength,
        level: VolatilityLevel::from_strength(strength, thresholds),
    })
}

/// 为每个时间维度 `d` 构建 `d` 日滚动均值序列，再求其变化指数与均值 / 标准差。
///
/// 结果与 `dimensions` 一一对齐；`d = 1` 即原始正值序列本身。
pub fn time_dimension_profile(
    values: &[f64],
    dimensions: &[usize],
    thresholds: &LevelThresholds,
) -> Vec<TimeDimensionProfile> {
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();

    dimensions
        .iter()
        .map(|&dimension| {
            let series = rolling_mean(&positive, dimension);
            TimeDimensionProfile {
                dimension,
                change_index: calculate_change_index(&series, thresholds).unwrap_or_else(ChangeIndex::neutral),
                moments: RollingMoments {
                    average: mean(&series),
                    std_dev: standard_deviation(&series, true),
                },
            }
        })
        .collect()
}
