//! Shared library for the Sentiment Compass backend.
//!
//! This crate holds the classification pipeline, the in-memory session and the
//! rollups the dashboard draws. The Lambda binaries are thin routing layers on top.

pub mod aggregate;
pub mod analysis;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod http;
pub mod intake;
pub mod metrics;
pub mod models;
pub mod pulse;
pub mod secrets;
pub mod session;

pub use aggregate::{audience_rollup, sentiment_trend, summarize};
pub use analysis::Analyzer;
pub use classifier::{ClassificationRequest, ClassificationService, GeminiClient};
pub use config::Config;
pub use dashboard::{ActionFailure, ActionResult, Dashboard, DashboardSnapshot};
pub use error::{Error, Result};
pub use export::{ExportFile, ExportFormat};
pub use metrics::{MetricsProvider, RandomMetrics};
pub use models::{
    AnalyzeRequest, BatchResponse, BatchStats, ClassifiedRecord, PulseRequest, Sentiment,
    SourceTag, UploadRequest,
};
pub use secrets::resolve_api_key;
pub use session::{Session, SessionEvent};
