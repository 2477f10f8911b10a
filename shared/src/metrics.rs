//! Engagement metrics attached to classified records.
//!
//! No real telemetry source is wired in yet. [`RandomMetrics`] fills the
//! dashboard with placeholder numbers; swap in another [`MetricsProvider`]
//! to feed real reach and audience data through the same merge path.

use rand::Rng;

use crate::models::{AgeGroup, EngagementMetrics};

/// Age brackets reported for every record, in display order.
pub const AGE_BRACKETS: [&str; 3] = ["18-24", "25-34", "35+"];

/// Supplies engagement metrics for a freshly classified signal.
pub trait MetricsProvider: Send + Sync {
    fn metrics_for(&self, text: &str) -> EngagementMetrics;
}

/// Random placeholder metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMetrics;

impl RandomMetrics {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> EngagementMetrics {
        let ranges: [(u32, u32); 3] = [(10, 50), (20, 60), (5, 25)];
        let age_groups = AGE_BRACKETS
            .iter()
            .zip(ranges)
            .map(|(label, (low, high))| AgeGroup {
                label: label.to_string(),
                value: rng.gen_range(low..high),
            })
            .collect();

        EngagementMetrics {
            reach: rng.gen_range(100..5100),
            mentions: rng.gen_range(1..=50),
            age_groups,
        }
    }
}

impl MetricsProvider for RandomMetrics {
    fn metrics_for(&self, _text: &str) -> EngagementMetrics {
        Self::generate(&mut rand::thread_rng())
    }
}
