//! 统计原语
//!
//! 纯函数，输入为按日期从旧到新排列的序列。空序列、零均值、零方差、窗口超出历史长度
//! 都属于数据状态，返回 0 / `None` 而不是报错；只有短窗口不小于长窗口、
//! EWMA 平滑系数越界这两种调用错误才返回 `Err`。

use crate::error::{AnalyticsError, Result};

/// EWMA 未显式给出 alpha 时使用的周期
pub const DEFAULT_EWMA_PERIOD: usize = 10;

/// Arithmetic mean; `0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (`sample = false`) or sample (n-1 divisor) standard deviation.
/// Returns `0` when fewer than two values are present.
pub fn standard_deviation(values: &[f64], sample: bool) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    let divisor = if sample { (n - 1) as f64 } else { n as f64 };
    (sum_sq / divisor).sqrt()
}

/// `stddev / mean`, undefined for an empty slice or a zero mean.
pub fn coefficient_of_variation(values: &[f64], sample: bool) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values);
    if m == 0.0 {
        return None;
    }
    Some(standard_deviation(values, sample) / m)
}

/// Exponentially weighted moving average.
///
/// `alpha` defaults to `2 / (period + 1)`. The first output equals the first input.
pub fn calculate_ewma(values: &[f64], alpha: Option<f64>, period: usize) -> Result<Vec<f64>> {
    let alpha = alpha.unwrap_or(2.0 / (period as f64 + 1.0));
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(AnalyticsError::InvalidAlpha(alpha));
    }

    let mut out = Vec::with_capacity(values.len());
    let mut prev = match values.first() {
        Some(&first) => first,
        None => return Ok(out),
    };
    out.push(prev);
    for &x in &values[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        out.push(prev);
    }
    Ok(out)
}

/// Standard score of every element against the whole series.
pub fn calculate_z_score(values: &[f64], sample: bool) -> Vec<f64> {
    match values.len() {
        0 => return Vec::new(),
        1 => return vec![0.0],
        _ => {}
    }
    let m = mean(values);
    let sd = standard_deviation(values, sample);
    if sd == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - m) / sd).collect()
}

/// 滚动变异系数：前 `window - 1` 个位置为 `None`，窗口均值为 0 的位置也为 `None`。
pub fn calculate_rolling_cv(values: &[f64], window: usize, sample: bool) -> Vec<Option<f64>> {
    rolling(values, window, |slice| coefficient_of_variation(slice, sample))
}

/// 短期均值 / 长期均值
pub fn calculate_short_long_mean_ratio(values: &[f64], short: usize, long: usize) -> Result<Vec<Option<f64>>> {
    check_windows(short, long)?;
    Ok(rolling(values, long, |slice| {
        let long_mean = mean(slice);
        if long_mean == 0.0 {
            return None;
        }
        Some(mean(&slice[slice.len() - short..]) / long_mean)
    }))
}

/// 滚动变化率指数的两种算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeRateMethod {
    /// 窗口对半切分，后半段均值相对前半段均值的变化率
    #[default]
    Mean,
    /// 窗口内逐日变化率绝对值的平均
    Cumulative,
}

pub fn calculate_rolling_change_rate_index(
    values: &[f64],
    window: usize,
    method: ChangeRateMethod,
) -> Vec<Option<f64>> {
    rolling(values, window, |slice| match method {
        ChangeRateMethod::Mean => {
            let (first, second) = slice.split_at(slice.len() / 2);
            let first_mean = mean(first);
            if first_mean == 0.0 {
                return None;
            }
            Some((mean(second) - first_mean) / first_mean)
        }
        ChangeRateMethod::Cumulative => {
            let rates: Vec<f64> = slice
                .windows(2)
                .filter(|pair| pair[0] != 0.0)
                .map(|pair| ((pair[1] - pair[0]) / pair[0]).abs())
                .collect();
            if rates.is_empty() { None } else { Some(mean(&rates)) }
        }
    })
}

/// 短期标准差 / 长期基线标准差
pub fn calculate_short_term_volatility_vs_long_term_baseline(
    values: &[f64],
    short: usize,
    long: usize,
    sample: bool,
) -> Result<Vec<Option<f64>>> {
    check_windows(short, long)?;
    Ok(rolling(values, long, |slice| {
        let long_sd = standard_deviation(slice, sample);
        if long_sd == 0.0 {
            return None;
        }
        Some(standard_deviation(&slice[slice.len() - short..], sample) / long_sd)
    }))
}

/// Dense trailing means, one per index `i >= window - 1`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    values.windows(window).map(mean).collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_windows(short: usize, long: usize) -> Result<()> {
    if short >= long {
        return Err(AnalyticsError::InvalidWindow { short, long });
    }
    Ok(())
}

/// Applies `f` to every trailing `window`-sized slice; output is aligned with `values`.
fn rolling<F>(values: &[f64], window: usize, mut f: F) -> Vec<Option<f64>>
where
    F: FnMut(&[f64]) -> Option<f64>,
{
    let n = values.len();
    if window == 0 || window > n {
        return vec![None; n];
    }
    let mut out = vec![None; window - 1];
    out.extend(values.windows(window).map(&mut f));
    out
}
