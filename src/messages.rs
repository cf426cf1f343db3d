//! 预警文案生成
//!
//! 纯格式化，不做任何发送。

use crate::models::{ChangeIndex, Metric, ProductReport, VolatilityLevel, WarningLevel};

/// Builds the warning sentence for one metric, graded by the change-index level.
pub fn change_index_message(metric: Metric, index: &ChangeIndex) -> String {
    let name = metric.display_name();
    let direction = index.direction.label();
    let level = index.level.label();

    match index.level {
        VolatilityLevel::Minimal | VolatilityLevel::Slight => format!(
            "{}呈{}趋势，波动{}，强度 {:.2}",
            name, direction, level, index.strength
        ),
        VolatilityLevel::Moderate => format!(
            "⚠️ {}呈{}趋势，波动{}，强度 {:.2}，值得关注",
            name, direction, level, index.strength
        ),
        VolatilityLevel::Obvious => format!(
            "🔶 {}呈{}趋势，波动{}，强度 {:.2}，需要重点关注",
            name, direction, level, index.strength
        ),
        VolatilityLevel::Severe => format!(
            "🔴 {}呈{}趋势，波动{}，强度 {:.2}，风险较高，建议及时处理",
            name, direction, level, index.strength
        ),
    }
}

pub(crate) fn warning_icon(level: WarningLevel) -> &'static str {
    match level {
        WarningLevel::Normal => "✅",
        WarningLevel::Minor => "🔵",
        WarningLevel::Moderate => "🟡",
        WarningLevel::Severe => "🚨",
    }
}

/// Multi-line product alert: tier header, both policy composites, one line per metric.
pub fn product_alert(report: &ProductReport) -> String {
    let worst = report.worst_level();
    let icon = warning_icon(worst);

    let mut message = format!(
        "{} *商品 {} 波动预警* {}\n\
        > *预警等级*: `{}`\n\
        > *级别评分*: `{:.2}` ({}) | *CV 评分*: `{:.2}` ({})\n\
        > *参考日期*: `{}`\n\
        > --------------------------------",
        icon, report.product_id, icon,
        worst.label(),
        report.level_warning.composite, report.level_warning.level.label(),
        report.cv_warning.composite, report.cv_warning.level.label(),
        report.reference_date.format("%Y-%m-%d"),
    );

    for (_, analysis) in report.metrics.iter() {
        message.push_str("\n> ");
        message.push_str(&analysis.message);
    }
    message
}
