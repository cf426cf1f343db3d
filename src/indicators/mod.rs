//! 波动指标模块
//!
//! - `sliding`: 短窗口 vs 长基线的滑动波动率
//! - `change_index`: 日变化率振幅指数与时间维度画像
//! - `warning`: 多指标、多口径的预警等级分类

pub mod sliding;
pub mod change_index;
pub mod warning;

pub use change_index::{calculate_change_index, time_dimension_profile};
pub use sliding::SlidingVolatilityCalculator;
pub use warning::WarningClassifier;
