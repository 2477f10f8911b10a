//! Remote classification service client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::{Config, Error, Result};

/// One structured-output request to the remote model.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    /// Natural-language instructions with the signals embedded
    pub prompt: String,
    /// Schema the JSON reply must conform to
    pub response_schema: Value,
}

/// A remote model that answers a prompt with schema-conforming JSON text.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Send the request and return the raw reply text.
    async fn generate(&self, request: &ClassificationRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client from configuration and a resolved API key.
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl ClassificationService for GeminiClient {
    async fn generate(&self, request: &ClassificationRequest) -> Result<String> {
        let body = build_request_body(request);

        debug!("Calling classifier model {}", self.model);

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload = response.text().await?;

        if !status.is_success() {
            error!("Classifier request failed: {} - {}", status, payload);
            return Err(status_error(status.as_u16(), &payload));
        }

        extract_text(&payload)
    }
}

fn build_request_body(request: &ClassificationRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

fn status_error(status: u16, payload: &str) -> Error {
    let message = match serde_json::from_str::<ErrorEnvelope>(payload) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{} ({})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => payload.trim().to_string(),
    };

    if status == 429 || status >= 500 {
        Error::Transport(format!("HTTP {}: {}", status, message))
    } else {
        Error::Remote { status, message }
    }
}

/// Pull the generated text out of a `generateContent` reply.
fn extract_text(payload: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|e| Error::MalformedResponse(format!("Unreadable classifier reply: {}", e)))?;

    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(Error::MalformedResponse(format!(
                "Classifier returned no result: {}",
                reason
            )));
        }
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::MalformedResponse(format!(
            "Classifier returned empty content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}
