//! Dashboard rollups over classified records.

use crate::metrics::AGE_BRACKETS;
use crate::models::{
    AudienceRollup, BatchStats, ClassifiedRecord, LabeledValue, Sentiment, SourceTag, TrendPoint,
};

/// Number of records plotted on the trend line.
pub const DEFAULT_TREND_WINDOW: usize = 20;

/// Traffic sources in display order.
const TRAFFIC_ORDER: [SourceTag; 5] = [
    SourceTag::Manual,
    SourceTag::X,
    SourceTag::TikTok,
    SourceTag::Facebook,
    SourceTag::Instagram,
];

/// Count records per sentiment and average their confidence.
pub fn summarize(records: &[ClassifiedRecord]) -> BatchStats {
    let mut stats = BatchStats {
        total: records.len(),
        ..BatchStats::default()
    };
    let mut confidence_sum = 0.0;

    for record in records {
        match record.sentiment() {
            Sentiment::Positive => stats.positive_count += 1,
            Sentiment::Negative => stats.negative_count += 1,
            Sentiment::Neutral => stats.neutral_count += 1,
        }
        confidence_sum += record.confidence();
    }

    if stats.total > 0 {
        stats.avg_confidence = confidence_sum / stats.total as f64;
    }

    stats
}

/// Reach, mentions, age and traffic-source breakdowns.
///
/// The age distribution is the average contribution per record for each
/// bracket in [`AGE_BRACKETS`]; unknown labels are ignored.
pub fn audience_rollup(records: &[ClassifiedRecord]) -> AudienceRollup {
    let mut age_totals = [0u64; AGE_BRACKETS.len()];
    let mut traffic = [0usize; TRAFFIC_ORDER.len()];
    let mut total_reach = 0u64;
    let mut total_mentions = 0u64;

    for record in records {
        total_reach += u64::from(record.metrics.reach);
        total_mentions += u64::from(record.metrics.mentions);

        for group in &record.metrics.age_groups {
            if let Some(idx) = AGE_BRACKETS.iter().position(|b| *b == group.label) {
                age_totals[idx] += u64::from(group.value);
            }
        }

        if let Some(idx) = TRAFFIC_ORDER.iter().position(|s| *s == record.source) {
            traffic[idx] += 1;
        }
    }

    let divisor = records.len().max(1) as f64;

    AudienceRollup {
        total_reach,
        total_mentions,
        signal_volume: records.len(),
        age_distribution: AGE_BRACKETS
            .iter()
            .zip(age_totals)
            .map(|(label, total)| LabeledValue {
                label: label.to_string(),
                value: total as f64 / divisor,
            })
            .collect(),
        traffic_sources: TRAFFIC_ORDER
            .iter()
            .zip(traffic)
            .map(|(source, count)| LabeledValue {
                label: source.display_label().to_string(),
                value: count,
            })
            .collect(),
    }
}

/// Plotted value of a sentiment on the 0-100 trend axis.
pub fn trend_value(sentiment: Sentiment) -> u8 {
    match sentiment {
        Sentiment::Positive => 90,
        Sentiment::Negative => 10,
        Sentiment::Neutral => 50,
    }
}

/// The newest `window` records, oldest first. Expects newest-first input.
pub fn sentiment_trend(records: &[ClassifiedRecord], window: usize) -> Vec<TrendPoint> {
    records
        .iter()
        .take(window)
        .rev()
        .map(|r| TrendPoint {
            id: r.id,
            sentiment: r.sentiment(),
            value: trend_value(r.sentiment()),
        })
        .collect()
}
