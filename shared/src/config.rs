//! Configuration management for the dashboard Lambda.

use std::env;

use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Classifier API key given directly
    pub api_key: Option<String>,
    /// ARN of the secret holding the classifier API key
    pub api_key_secret_arn: Option<String>,
    /// Remote model id
    pub model: String,
    /// Classifier API base URL
    pub endpoint: String,
    /// HTTP timeout for classifier calls
    pub request_timeout_secs: u64,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY");
        let api_key_secret_arn = non_empty("GEMINI_API_KEY_SECRET_ARN");
        if api_key.is_none() && api_key_secret_arn.is_none() {
            return Err(Error::Config(
                "GEMINI_API_KEY or GEMINI_API_KEY_SECRET_ARN must be set".to_string(),
            ));
        }

        let request_timeout_secs = match non_empty("CLASSIFIER_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("CLASSIFIER_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_key_secret_arn,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: non_empty("GEMINI_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout_secs,
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[("GEMINI_MODEL", "x")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.aws_region, "us-east-1");
    }

    #[test]
    fn test_secret_arn_and_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY_SECRET_ARN", "arn:aws:secretsmanager:eu-west-1:1:secret:gemini"),
            ("GEMINI_ENDPOINT", "http://localhost:8080/"),
            ("CLASSIFIER_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_bad_timeout() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("CLASSIFIER_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
