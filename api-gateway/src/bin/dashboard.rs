//! Dashboard Lambda - Classifies signals and serves the session rollups.
//!
//! Endpoints:
//! - POST /v1/analyze - Classify manually entered text, one signal per line
//! - POST /v1/upload - Classify the lines of an uploaded text file
//! - POST /v1/pulse - Run a simulated social search for a keyword
//! - GET /v1/records - List session records, newest first
//! - GET /v1/summary - Sentiment stats, audience rollup and trend
//! - GET /v1/export/{json|csv|report} - Download the session
//! - DELETE /v1/session - Discard the session

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, file_response, success_response};
use shared::{
    parse_body, resolve_api_key, ActionResult, AnalyzeRequest, Analyzer, Config, Dashboard,
    ExportFormat, GeminiClient, PulseRequest, RandomMetrics, UploadRequest,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    dashboard: Dashboard,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let api_key = resolve_api_key(&config).await?;

        info!("Using classifier model {}", config.model);

        let classifier = GeminiClient::new(&config, api_key)?;
        let analyzer = Analyzer::new(Arc::new(classifier), Arc::new(RandomMetrics));

        Ok(Self {
            dashboard: Dashboard::new(analyzer),
        })
    }
}

fn action_response(result: ActionResult) -> Result<Response<Body>, Error> {
    match result {
        Ok(batch) => success_response(200, batch),
        Err(failure) => {
            if failure.error.is_retryable() {
                warn!("Retryable classifier failure: {}", failure.error);
            }
            error_response(failure.status_code(), failure.message)
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Dashboard request: {} {}", method, path);

    let dashboard = &state.dashboard;

    match (method, path) {
        ("POST", "/v1/analyze") => {
            let request: AnalyzeRequest = parse_body!(event.body());
            action_response(dashboard.submit_manual(&request.text).await)
        }

        ("POST", "/v1/upload") => {
            let request: UploadRequest = parse_body!(event.body());
            if let Some(name) = &request.filename {
                info!("Processing upload {}", name);
            }
            action_response(dashboard.upload(&request.content).await)
        }

        ("POST", "/v1/pulse") => {
            let request: PulseRequest = parse_body!(event.body());
            action_response(
                dashboard
                    .social_pulse(&request.keyword, &request.platforms)
                    .await,
            )
        }

        ("GET", "/v1/records") => success_response(200, dashboard.records().await),

        ("GET", "/v1/summary") => success_response(200, dashboard.snapshot().await),

        ("DELETE", "/v1/session") => {
            dashboard.reset().await;
            success_response(200, serde_json::json!({ "cleared": true }))
        }

        ("GET", p) if p.starts_with("/v1/export/") => {
            let format: ExportFormat = match p["/v1/export/".len()..].parse() {
                Ok(format) => format,
                Err(e) => return error_response(400, e.to_string()),
            };

            match dashboard.export(format).await {
                Ok(file) => file_response(file),
                Err(e) => {
                    error!("Export failed: {}", e);
                    error_response(e.status_code(), "Export failed")
                }
            }
        }

        _ => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
