//! Shared data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Where a signal conceptually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    Manual,
    X,
    Facebook,
    Instagram,
    TikTok,
}

impl SourceTag {
    /// Label used by the traffic-source breakdown.
    pub fn display_label(&self) -> &'static str {
        match self {
            SourceTag::Manual => "Direct",
            SourceTag::X => "X",
            SourceTag::Facebook => "Facebook",
            SourceTag::Instagram => "Instagram",
            SourceTag::TikTok => "TikTok",
        }
    }
}

/// Sentiment class assigned by the remote classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const LABELS: [&'static str; 3] = ["Positive", "Negative", "Neutral"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The model occasionally lowercases labels.
impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            _ => Err(serde::de::Error::unknown_variant(&raw, &Sentiment::LABELS)),
        }
    }
}

/// Fields produced by the remote classifier for one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub confidence_score: f64,
    pub primary_language: String,
    pub code_switched: bool,
    pub key_emotive_phrases: Vec<String>,
    pub business_insight: String,
    pub explanation: String,
}

/// Share of an audience falling into one age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroup {
    pub label: String,
    pub value: u32,
}

/// Placeholder engagement data attached to each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub reach: u32,
    pub mentions: u32,
    pub age_groups: Vec<AgeGroup>,
}

/// One analyzed signal plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub id: Uuid,
    pub text: String,
    pub source: SourceTag,
    #[serde(flatten)]
    pub classification: Classification,
    pub timestamp: DateTime<Utc>,
    pub metrics: EngagementMetrics,
}

impl ClassifiedRecord {
    pub fn sentiment(&self) -> Sentiment {
        self.classification.sentiment
    }

    pub fn confidence(&self) -> f64 {
        self.classification.confidence_score
    }
}

/// Sentiment counts over a record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub avg_confidence: f64,
}

/// Labelled value used by the distribution rollups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue<T> {
    pub label: String,
    pub value: T,
}

/// Engagement rollup drawn by the audience panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceRollup {
    pub total_reach: u64,
    pub total_mentions: u64,
    pub signal_volume: usize,
    pub age_distribution: Vec<LabeledValue<f64>>,
    pub traffic_sources: Vec<LabeledValue<usize>>,
}

/// One point of the sentiment trend line, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub id: Uuid,
    pub sentiment: Sentiment,
    pub value: u8,
}

/// Manual submission payload.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// File upload payload; the file body travels as text.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub content: String,
    pub filename: Option<String>,
}

/// Social pulse search payload.
#[derive(Debug, Deserialize)]
pub struct PulseRequest {
    pub keyword: String,
    #[serde(default)]
    pub platforms: Vec<SourceTag>,
}

/// Result of one user action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub records: Vec<ClassifiedRecord>,
    pub stats: BatchStats,
}
