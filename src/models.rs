//! 波动率与预警数据模型
//!
//! 所有结构都是纯值对象：每次请求基于新查询到的日序列重新计算，不缓存、不修改。
//! 序列化字段名与前端看板保持一致，级别枚举直接序列化为中文标签。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LevelThresholds;

/// 参与预警评分的三个指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Visitors,
    AdCost,
    Sales,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Visitors, Metric::AdCost, Metric::Sales];

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Visitors => "访客数",
            Metric::AdCost => "广告花费",
            Metric::Sales => "销售额",
        }
    }
}

/// 波动方向：短期均值不低于长期均值为 `+`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "+")]
    Up,
    #[serde(rename = "-")]
    Down,
}

impl Direction {
    pub fn from_sign(value: f64) -> Self {
        if value >= 0.0 { Direction::Up } else { Direction::Down }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "上升",
            Direction::Down => "下降",
        }
    }
}

/// 波动强度的定性分级 (极小 < 轻微 < 一般 < 明显 < 剧烈)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VolatilityLevel {
    #[serde(rename = "极小")]
    Minimal,
    #[serde(rename = "轻微")]
    Slight,
    #[serde(rename = "一般")]
    Moderate,
    #[serde(rename = "明显")]
    Obvious,
    #[serde(rename = "剧烈")]
    Severe,
}

impl VolatilityLevel {
    /// 按阈值分桶，区间上界不含；不低于 `obvious` 的一律归为剧烈。
    pub fn from_strength(strength: f64, thresholds: &LevelThresholds) -> Self {
        if strength < thresholds.minimal {
            VolatilityLevel::Minimal
        } else if strength < thresholds.slight {
            VolatilityLevel::Slight
        } else if strength < thresholds.moderate {
            VolatilityLevel::Moderate
        } else if strength < thresholds.obvious {
            VolatilityLevel::Obvious
        } else {
            VolatilityLevel::Severe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VolatilityLevel::Minimal => "极小",
            VolatilityLevel::Slight => "轻微",
            VolatilityLevel::Moderate => "一般",
            VolatilityLevel::Obvious => "明显",
            VolatilityLevel::Severe => "剧烈",
        }
    }
}

/// 商品预警等级 (正常 < 轻微 < 一般 < 严重)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningLevel {
    #[serde(rename = "正常")]
    Normal,
    #[serde(rename = "轻微")]
    Minor,
    #[serde(rename = "一般")]
    Moderate,
    #[serde(rename = "严重")]
    Severe,
}

impl WarningLevel {
    pub fn label(self) -> &'static str {
        match self {
            WarningLevel::Normal => "正常",
            WarningLevel::Minor => "轻微",
            WarningLevel::Moderate => "一般",
            WarningLevel::Severe => "严重",
        }
    }
}

/// 单个窗口的波动描述
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityDescriptor {
    pub window: usize,
    pub direction: Direction,
    pub strength: f64,
    pub level: VolatilityLevel,
}

impl VolatilityDescriptor {
    /// 中性默认值 `{+, 0, 极小}`
    pub fn neutral(window: usize) -> Self {
        Self {
            window,
            direction: Direction::Up,
            strength: 0.0,
            level: VolatilityLevel::Minimal,
        }
    }
}

/// 滑动波动率计算结果
///
/// 历史不足与基线完全平稳在下游渲染上相同，但在这里保持可区分。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolatilityResult {
    Computed(VolatilityDescriptor),
    /// 有效样本不足以同时满足短窗口与长基线
    InsufficientData { window: usize },
    /// 长基线标准差为 0，比值无定义
    FlatBaseline { window: usize },
}

impl VolatilityResult {
    pub fn window(&self) -> usize {
        match self {
            VolatilityResult::Computed(d) => d.window,
            VolatilityResult::InsufficientData { window } | VolatilityResult::FlatBaseline { window } => *window,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, VolatilityResult::Computed(_))
    }

    /// 输出边界：折叠为描述对象，强度在此处统一保留两位小数
    pub fn into_descriptor(self) -> VolatilityDescriptor {
        match self {
            VolatilityResult::Computed(d) => VolatilityDescriptor {
                strength: crate::stats::round2(d.strength),
                ..d
            },
            VolatilityResult::InsufficientData { window } | VolatilityResult::FlatBaseline { window } => {
                VolatilityDescriptor::neutral(window)
            }
        }
    }
}

/// 整段序列的日变化率振幅指数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeIndex {
    pub direction: Direction,
    pub strength: f64,
    pub level: VolatilityLevel,
}

impl ChangeIndex {
    pub fn neutral() -> Self {
        Self {
            direction: Direction::Up,
            strength: 0.0,
            level: VolatilityLevel::Minimal,
        }
    }

    pub fn rounded(self) -> Self {
        Self {
            strength: crate::stats::round2(self.strength),
            ..self
        }
    }
}

/// 某一时间维度的滚动均值 / 标准差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingMoments {
    pub average: f64,
    pub std_dev: f64,
}

/// 单个时间维度 (30/15/7/3/1 天) 的画像
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDimensionProfile {
    pub dimension: usize,
    pub change_index: ChangeIndex,
    pub moments: RollingMoments,
}

/// 1 日 / 3 日两个评估口径
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPair<T> {
    pub one_day: T,
    pub three_day: T,
}

impl<T: Clone> HorizonPair<T> {
    /// 从与 `dimensions` 对齐的数组中取出 1 日与 3 日两项。
    /// 默认维度 `[30, 15, 7, 3, 1]` 下即下标 4 与 3。
    pub fn from_dimensions(values: &[T], dimensions: &[usize]) -> Option<Self> {
        if values.len() != dimensions.len() {
            return None;
        }
        let one = dimensions.iter().position(|&d| d == 1)?;
        let three = dimensions.iter().position(|&d| d == 3)?;
        Some(Self {
            one_day: values[one].clone(),
            three_day: values[three].clone(),
        })
    }
}

/// 按指标分组的三元组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet<T> {
    pub visitors: T,
    pub ad_cost: T,
    pub sales: T,
}

impl<T> MetricSet<T> {
    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::Visitors => &self.visitors,
            Metric::AdCost => &self.ad_cost,
            Metric::Sales => &self.sales,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self {
            visitors: f(Metric::Visitors),
            ad_cost: f(Metric::AdCost),
            sales: f(Metric::Sales),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Metric, &T) -> U) -> MetricSet<U> {
        MetricSet {
            visitors: f(Metric::Visitors, &self.visitors),
            ad_cost: f(Metric::AdCost, &self.ad_cost),
            sales: f(Metric::Sales, &self.sales),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// 综合评分与对应预警等级
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarningAssessment {
    pub composite: f64,
    pub level: WarningLevel,
}

/// 上游数据层提供的单日记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub visitors: f64,
    #[serde(default)]
    pub ad_cost: f64,
    #[serde(default)]
    pub sales: f64,
}

/// 单个商品的输入：截至参考日期的日记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeries {
    pub product_id: String,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub records: Vec<DailyRecord>,
}

/// 单指标的完整分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAnalysis {
    pub sliding: Vec<VolatilityDescriptor>,
    pub change_index: ChangeIndex,
    pub dimensions: Vec<TimeDimensionProfile>,
    pub message: String,
}

/// 单个商品的分析报告，交给持久化 / JSON 序列化层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub product_id: String,
    pub reference_date: NaiveDate,
    pub metrics: MetricSet<MetricAnalysis>,
    pub level_warning: WarningAssessment,
    pub cv_warning: WarningAssessment,
    pub alert: String,
}

impl ProductReport {
    /// 两套策略中更严重的一级
    pub fn worst_level(&self) -> WarningLevel {
        self.level_warning.level.max(self.cv_warning.level)
    }
}
