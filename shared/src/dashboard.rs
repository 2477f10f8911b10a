//! User actions against the in-memory session.
//!
//! Each action filters its input, makes at most one classifier call and
//! folds the outcome into the session. Invalid input is a silent no-op. A
//! failed call leaves the records untouched and stores a user-facing message.
//! The session lock is never held while the classifier is being called.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error as ThisError;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::aggregate::{audience_rollup, sentiment_trend, DEFAULT_TREND_WINDOW};
use crate::analysis::Analyzer;
use crate::export::{self, ExportFile, ExportFormat};
use crate::intake::{manual_signals, upload_signals};
use crate::models::{
    AudienceRollup, BatchResponse, BatchStats, ClassifiedRecord, SourceTag, TrendPoint,
};
use crate::pulse::fetch_pulse;
use crate::session::{Session, SessionEvent};
use crate::{Error, Result};

const ANALYSIS_FAILED: &str = "Analysis failed.";
const PULSE_FAILED: &str = "Pulse fetch failed.";
const UPLOAD_FAILED: &str = "File upload analysis failed.";

/// Everything the dashboard draws, derived from the current session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: BatchStats,
    pub audience: AudienceRollup,
    pub trend: Vec<TrendPoint>,
    pub latest: Option<ClassifiedRecord>,
    pub busy: bool,
    pub last_error: Option<String>,
}

/// A failed user action with the message shown to the user.
#[derive(ThisError, Debug)]
#[error("{message}")]
pub struct ActionFailure {
    pub message: String,
    #[source]
    pub error: Error,
}

impl ActionFailure {
    pub fn status_code(&self) -> u16 {
        self.error.status_code()
    }
}

pub type ActionResult = std::result::Result<BatchResponse, ActionFailure>;

/// How a failed action is reported to the user.
#[derive(Clone, Copy)]
enum FailureMessage {
    /// Use the error's own text, or this when it has none
    Fallback(&'static str),
    /// Always use this text
    Fixed(&'static str),
}

impl FailureMessage {
    fn for_error(&self, err: &Error) -> String {
        match self {
            FailureMessage::Fixed(message) => message.to_string(),
            FailureMessage::Fallback(fallback) => {
                let message = err.to_string();
                if message.trim().is_empty() {
                    fallback.to_string()
                } else {
                    message
                }
            }
        }
    }
}

/// Session-backed dashboard service.
pub struct Dashboard {
    analyzer: Analyzer,
    session: RwLock<Session>,
}

impl Dashboard {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            session: RwLock::new(Session::new()),
        }
    }

    /// Classify a manual submission, one signal per meaningful line.
    pub async fn submit_manual(&self, input: &str) -> ActionResult {
        let signals = manual_signals(input);
        if signals.is_empty() {
            return self.noop().await;
        }

        self.run_action(FailureMessage::Fallback(ANALYSIS_FAILED), async {
            self.analyzer.analyze(&signals, SourceTag::Manual).await
        })
        .await
    }

    /// Classify the first lines of an uploaded text file.
    pub async fn upload(&self, content: &str) -> ActionResult {
        let signals = upload_signals(content);
        if signals.is_empty() {
            return self.noop().await;
        }

        self.run_action(FailureMessage::Fixed(UPLOAD_FAILED), async {
            self.analyzer.analyze(&signals, SourceTag::Manual).await
        })
        .await
    }

    /// Run a simulated social search for `keyword` on `platforms`.
    pub async fn social_pulse(&self, keyword: &str, platforms: &[SourceTag]) -> ActionResult {
        if keyword.trim().is_empty() || platforms.is_empty() {
            return self.noop().await;
        }

        self.run_action(FailureMessage::Fallback(PULSE_FAILED), async {
            fetch_pulse(&self.analyzer, keyword, platforms).await
        })
        .await
    }

    async fn noop(&self) -> ActionResult {
        let stats = self.session.read().await.stats();
        Ok(BatchResponse {
            records: Vec::new(),
            stats,
        })
    }

    async fn run_action<F>(&self, failure: FailureMessage, call: F) -> ActionResult
    where
        F: std::future::Future<Output = Result<Vec<ClassifiedRecord>>>,
    {
        self.session.write().await.apply(SessionEvent::ActionStarted);

        match call.await {
            Ok(records) => {
                let mut session = self.session.write().await;
                session.apply(SessionEvent::BatchAnalyzed(records.clone()));
                info!(
                    "Added {} record(s), session now holds {}",
                    records.len(),
                    session.records().len()
                );
                Ok(BatchResponse {
                    records,
                    stats: session.stats(),
                })
            }
            Err(err) => {
                error!("Action failed: {}", err);
                let message = failure.for_error(&err);
                self.session
                    .write()
                    .await
                    .apply(SessionEvent::ActionFailed(message.clone()));
                Err(ActionFailure {
                    message,
                    error: err,
                })
            }
        }
    }

    pub async fn records(&self) -> Vec<ClassifiedRecord> {
        self.session.read().await.records().to_vec()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let session = self.session.read().await;
        let records = session.records();
        DashboardSnapshot {
            stats: session.stats(),
            audience: audience_rollup(records),
            trend: sentiment_trend(records, DEFAULT_TREND_WINDOW),
            latest: records.first().cloned(),
            busy: session.is_busy(),
            last_error: session.last_error().map(str::to_string),
        }
    }

    pub async fn export(&self, format: ExportFormat) -> Result<ExportFile> {
        let session = self.session.read().await;
        export::render(format, session.records(), Utc::now())
    }

    /// Discard every record in the session.
    pub async fn reset(&self) {
        self.session.write().await.apply(SessionEvent::Reset);
        info!("Session cleared");
    }
}
