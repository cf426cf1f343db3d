use std::collections::BTreeMap;

use crate::config::WarningThresholds;
use crate::messages::warning_icon;
use crate::models::WarningLevel;

/// Histogram of composite warning scores across a batch of products.
///
/// Buckets are labelled with the warning tier their lower bound falls into, so the
/// report reads as a distribution over tiers as well as over raw scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDistribution {
    pub buckets: Vec<usize>,
    pub count: u32,
    pub step: f64,
    pub thresholds: WarningThresholds,
    /// Exact per-tier counts, classified from the unbucketed score.
    pub tier_counts: BTreeMap<WarningLevel, u32>,
}

impl CompositeDistribution {
    pub fn new(step: f64, bucket_count: usize, thresholds: WarningThresholds) -> Self {
        let tier_counts = [
            WarningLevel::Normal,
            WarningLevel::Minor,
            WarningLevel::Moderate,
            WarningLevel::Severe,
        ]
        .into_iter()
        .map(|level| (level, 0))
        .collect();

        Self {
            buckets: vec![0; bucket_count.max(1)],
            count: 0,
            step,
            thresholds,
            tier_counts,
        }
    }

    pub fn record(&mut self, score: f64) {
        self.count += 1;
        *self.tier_counts.entry(self.thresholds.classify(score)).or_insert(0) += 1;

        // Negative and NaN scores land in the first bucket; `as usize` saturates at 0.
        let max_idx = self.buckets.len() - 1;
        let index = ((score / self.step) as usize).min(max_idx);
        self.buckets[index] += 1;
    }

    /// Tier of the bucket's lower bound, and whether a tier boundary cuts through the bucket.
    fn bucket_tier(&self, lower: f64, upper: f64) -> (WarningLevel, bool) {
        let eps = self.step * 1e-9;
        let t = &self.thresholds;
        let straddles = [t.minor, t.moderate, t.severe]
            .iter()
            .any(|&b| b > lower + eps && b < upper - eps);
        (t.classify(lower + eps), straddles)
    }

    /// Generates a sparse text histogram (empty buckets are skipped) followed by a tier summary.
    pub fn generate_report(&self, title: &str) -> String {
        let total_buckets = self.buckets.len();
        let active_buckets = self.buckets.iter().filter(|&&c| c > 0).count();
        let t = &self.thresholds;

        let mut report = format!(
            "📊 *Composite Score Distribution ({})*\nStep: `{:.2}` | Total Products: `{}` | Tiers: 轻微 ≥{:.2} 一般 ≥{:.2} 严重 ≥{:.2}\n```\n",
            title, self.step, self.count, t.minor, t.moderate, t.severe
        );

        if active_buckets == 0 {
            report.push_str("   (No products recorded in this batch)\n");
            report.push_str("```");
            return report;
        }

        for (i, &count) in self.buckets.iter().enumerate() {
            if count == 0 {
                continue;
            }

            let lower = i as f64 * self.step;
            let upper = (i + 1) as f64 * self.step;
            let last = i == total_buckets - 1;
            let (tier, straddles) = self.bucket_tier(lower, if last { f64::INFINITY } else { upper });

            let range = if last {
                format!("{:.2}+", lower)
            } else {
                format!("{:.2}-{:.2}", lower, upper)
            };
            let mark = if straddles { "*" } else { "" };

            let percentage = (count as f64 / self.count as f64) * 100.0;
            // 1 character per 2%
            let bar = "█".repeat((percentage / 2.0).round() as usize);

            report.push_str(&format!(
                "{} {:<10} {}{}: {} ({:.1}%)\n",
                warning_icon(tier),
                range,
                tier.label(),
                mark,
                bar,
                percentage
            ));
        }

        report.push_str("\n----------------------------------\n");
        for (tier, lower, upper) in [
            (WarningLevel::Severe, t.severe, None),
            (WarningLevel::Moderate, t.moderate, Some(t.severe)),
            (WarningLevel::Minor, t.minor, Some(t.moderate)),
            (WarningLevel::Normal, 0.0, Some(t.minor)),
        ] {
            let n = self.tier_counts.get(&tier).copied().unwrap_or(0);
            let range = match upper {
                Some(u) => format!("[{:.2}, {:.2})", lower, u),
                None => format!("[{:.2}, 1.00]", lower),
            };
            report.push_str(&format!(
                "{} {} {}: {} ({:.1}%)\n",
                warning_icon(tier),
                tier.label(),
                range,
                n,
                n as f64 / self.count as f64 * 100.0
            ));
        }

        let hidden_count = total_buckets - active_buckets;
        if hidden_count > 0 {
            report.push_str(&format!("ℹ️ {} empty buckets hidden\n", hidden_count));
        }
        if self.buckets.iter().enumerate().any(|(i, &c)| {
            c > 0 && i < total_buckets - 1 && self.bucket_tier(i as f64 * self.step, (i + 1) as f64 * self.step).1
        }) {
            report.push_str("* bucket spans a tier boundary, labelled by its lower bound\n");
        }

        report.push_str("```");
        report
    }
}
