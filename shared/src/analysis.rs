//! Batch sentiment analysis against the remote classifier.
//!
//! A whole batch of signals goes out in a single request and comes back as a
//! JSON array, one element per signal in the same order. The batch either
//! succeeds as a whole or fails as a whole.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::{ClassificationRequest, ClassificationService};
use crate::metrics::MetricsProvider;
use crate::models::{Classification, ClassifiedRecord, Sentiment, SourceTag};
use crate::{Error, Result};

/// Separator placed between signals inside the prompt.
pub const SIGNAL_SEPARATOR: &str = "\n---\n";

/// Builds classifier requests and turns replies into records.
#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn ClassificationService>,
    metrics: Arc<dyn MetricsProvider>,
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn ClassificationService>,
        metrics: Arc<dyn MetricsProvider>,
    ) -> Self {
        Self {
            classifier,
            metrics,
        }
    }

    /// Classify `texts` in one remote call, returning one record per text.
    pub async fn analyze(&self, texts: &[String], source: SourceTag) -> Result<Vec<ClassifiedRecord>> {
        if texts.is_empty() {
            return Err(Error::Validation("No signals to analyze".to_string()));
        }

        let request = ClassificationRequest {
            prompt: build_prompt(texts),
            response_schema: response_schema(),
        };

        info!("Classifying {} signal(s) from {:?}", texts.len(), source);

        let reply = self.classifier.generate(&request).await?;
        let classifications = parse_classifications(&reply)?;

        if classifications.len() != texts.len() {
            warn!(
                "Classifier returned {} results for {} signals",
                classifications.len(),
                texts.len()
            );
            return Err(Error::BatchMismatch {
                expected: texts.len(),
                actual: classifications.len(),
            });
        }

        let timestamp = Utc::now();
        let records = texts
            .iter()
            .zip(classifications)
            .map(|(text, classification)| ClassifiedRecord {
                id: Uuid::new_v4(),
                text: text.clone(),
                source,
                classification,
                timestamp,
                metrics: self.metrics.metrics_for(text),
            })
            .collect();

        Ok(records)
    }
}

/// Instructions sent to the classifier with every signal embedded.
pub fn build_prompt(texts: &[String]) -> String {
    format!(
        "Analyze the sentiment of the following South African social media and review signals.\n\
         Take local slang into account (Sharp sharp, Local is lekker, Aweh, Ayoba, Eish, Kwakubheda) \
         as well as code-switching between languages.\n\
         \n\
         Signals:\n\
         {}\n\
         \n\
         Return one result per signal, in the same order. For each signal, identify the words \
         driving the sentiment and explain the reasoning.",
        texts.join(SIGNAL_SEPARATOR)
    )
}

/// Structured-output schema: an array with one object per signal.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "sentiment": {
                    "type": "STRING",
                    "enum": Sentiment::LABELS,
                    "description": "Positive, Negative, or Neutral"
                },
                "confidence_score": { "type": "NUMBER" },
                "primary_language": { "type": "STRING" },
                "code_switched": { "type": "BOOLEAN" },
                "key_emotive_phrases": { "type": "ARRAY", "items": { "type": "STRING" } },
                "business_insight": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            },
            "required": [
                "sentiment",
                "confidence_score",
                "primary_language",
                "code_switched",
                "key_emotive_phrases",
                "business_insight",
                "explanation"
            ]
        }
    })
}

/// Parse the classifier's JSON reply.
pub fn parse_classifications(reply: &str) -> Result<Vec<Classification>> {
    serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| Error::MalformedResponse(format!("Reply does not match schema: {}", e)))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AgeGroup, EngagementMetrics};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with a fixed body and remembers every prompt it saw.
    pub struct StubClassifier {
        reply: std::result::Result<String, String>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubClassifier {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: Ok(reply.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                reply: Err(message.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClassificationService for StubClassifier {
        async fn generate(&self, request: &ClassificationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(message) => Err(Error::Transport(message.clone())),
            }
        }
    }

    pub struct FixedMetrics;

    impl MetricsProvider for FixedMetrics {
        fn metrics_for(&self, _text: &str) -> EngagementMetrics {
            EngagementMetrics {
                reach: 1000,
                mentions: 10,
                age_groups: vec![
                    AgeGroup { label: "18-24".to_string(), value: 30 },
                    AgeGroup { label: "25-34".to_string(), value: 40 },
                    AgeGroup { label: "35+".to_string(), value: 10 },
                ],
            }
        }
    }

    /// A reply body with one element per (sentiment, confidence) pair.
    pub fn reply_for(results: &[(&str, f64)]) -> String {
        let items: Vec<Value> = results
            .iter()
            .map(|(sentiment, confidence)| {
                json!({
                    "sentiment": sentiment,
                    "confidence_score": confidence,
                    "primary_language": "English",
                    "code_switched": false,
                    "key_emotive_phrases": ["service"],
                    "business_insight": "Keep it up",
                    "explanation": "Echoed text should never be used",
                    "text": "model echo"
                })
            })
            .collect();
        Value::Array(items).to_string()
    }

    pub fn analyzer_with(classifier: Arc<StubClassifier>) -> Analyzer {
        Analyzer::new(classifier, Arc::new(FixedMetrics))
    }

    fn texts(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_record_per_text_in_order() {
        let stub = Arc::new(StubClassifier::replying(reply_for(&[
            ("Positive", 0.9),
            ("Negative", 0.8),
            ("Neutral", 0.5),
        ])));
        let analyzer = analyzer_with(stub.clone());
        let input = texts(&["Great service!", "Terrible wait", "It was fine"]);

        let records = analyzer.analyze(&input, SourceTag::Manual).await.unwrap();

        assert_eq!(records.len(), 3);
        for (record, text) in records.iter().zip(&input) {
            assert_eq!(&record.text, text);
            assert_eq!(record.source, SourceTag::Manual);
            assert_eq!(record.metrics.reach, 1000);
        }
        assert_eq!(records[0].sentiment(), Sentiment::Positive);
        assert_eq!(records[1].sentiment(), Sentiment::Negative);
        assert_eq!(records[2].sentiment(), Sentiment::Neutral);
        assert_ne!(records[0].id, records[1].id);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompt_embeds_all_signals() {
        let stub = Arc::new(StubClassifier::replying(reply_for(&[
            ("Positive", 0.7),
            ("Positive", 0.6),
        ])));
        let analyzer = analyzer_with(stub.clone());

        analyzer
            .analyze(&texts(&["Aweh, lekker vibes", "Sharp sharp"]), SourceTag::X)
            .await
            .unwrap();

        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("Aweh, lekker vibes\n---\nSharp sharp"));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_classifier() {
        let stub = Arc::new(StubClassifier::replying("[]"));
        let analyzer = analyzer_with(stub.clone());

        let err = analyzer.analyze(&[], SourceTag::Manual).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_length_mismatch_rejects_batch() {
        let stub = Arc::new(StubClassifier::replying(reply_for(&[("Positive", 0.9)])));
        let analyzer = analyzer_with(stub);

        let err = analyzer
            .analyze(&texts(&["first signal", "second signal"]), SourceTag::Manual)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BatchMismatch { expected: 2, actual: 1 }));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let analyzer = analyzer_with(Arc::new(StubClassifier::failing("connection reset")));

        let err = analyzer
            .analyze(&texts(&["anything at all"]), SourceTag::Manual)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[test]
    fn test_parse_rejects_schema_violations() {
        assert!(matches!(
            parse_classifications("not json"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_classifications(r#"[{"sentiment": "Positive"}]"#),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_tolerates_code_fence() {
        let fenced = format!("```json\n{}\n```", reply_for(&[("neutral", 0.4)]));
        let parsed = parse_classifications(&fenced).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = response_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        let properties = schema["items"]["properties"].as_object().unwrap();
        assert_eq!(required.len(), 7);
        for field in required {
            assert!(properties.contains_key(field.as_str().unwrap()));
        }
    }
}
