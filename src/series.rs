//! 日期对齐
//!
//! 把上游按日期查询到的记录铺到以参考日期为终点的连续日历窗口上。

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::models::{DailyRecord, Metric};

/// 对齐后的三条指标序列，从旧到新，每天一格
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSeries {
    pub visitors: Vec<f64>,
    pub ad_cost: Vec<f64>,
    pub sales: Vec<f64>,
}

impl AlignedSeries {
    pub fn metric(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Visitors => &self.visitors,
            Metric::AdCost => &self.ad_cost,
            Metric::Sales => &self.sales,
        }
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

/// 覆盖 `(end_date - days, end_date]` 的日历窗口。
///
/// 缺失日期补 0 (下游计算器把非正值当作占位)，同一天的多条记录累加，窗口外的记录忽略。
/// 窗口起点超出日期可表示范围时，整段保持占位值。
pub fn align_daily(records: &[DailyRecord], end_date: NaiveDate, days: u32) -> AlignedSeries {
    let len = days as usize;
    let mut aligned = AlignedSeries {
        visitors: vec![0.0; len],
        ad_cost: vec![0.0; len],
        sales: vec![0.0; len],
    };
    if len == 0 {
        return aligned;
    }

    let Some(start) = end_date.checked_sub_days(Days::new(u64::from(days) - 1)) else {
        warn!(%end_date, days, "lookback window starts before the earliest representable date");
        return aligned;
    };
    for record in records {
        let offset = (record.date - start).num_days();
        if offset < 0 || offset >= i64::from(days) {
            continue;
        }
        let idx = offset as usize;
        aligned.visitors[idx] += record.visitors;
        aligned.ad_cost[idx] += record.ad_cost;
        aligned.sales[idx] += record.sales;
    }
    aligned
}
