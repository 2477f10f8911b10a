//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Config, Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Classifier key stored as a JSON secret.
#[derive(Debug, Deserialize)]
struct ApiKeySecret {
    #[serde(alias = "GEMINI_API_KEY", alias = "apiKey")]
    api_key: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Read the API key out of a secret stored either raw or as JSON.
pub fn parse_api_key(secret: &str) -> Result<String> {
    let trimmed = secret.trim();
    let key = if trimmed.starts_with('{') {
        serde_json::from_str::<ApiKeySecret>(trimmed)
            .map_err(|e| Error::Aws(format!("Failed to parse API key secret: {}", e)))?
            .api_key
    } else {
        trimmed.to_string()
    };

    if key.is_empty() {
        return Err(Error::Config("Classifier API key is empty".to_string()));
    }
    Ok(key)
}

/// Resolve the classifier API key from the environment or Secrets Manager.
pub async fn resolve_api_key(config: &Config) -> Result<String> {
    if let Some(key) = &config.api_key {
        return Ok(key.clone());
    }

    let secret_arn = config.api_key_secret_arn.as_deref().ok_or_else(|| {
        Error::Config("GEMINI_API_KEY or GEMINI_API_KEY_SECRET_ARN must be set".to_string())
    })?;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let client = SecretsClient::new(&aws_config);

    info!("Loading classifier API key from Secrets Manager");
    parse_api_key(&get_secret(&client, secret_arn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_key() {
        assert_eq!(parse_api_key("  AIzaRawKey\n").unwrap(), "AIzaRawKey");
    }

    #[test]
    fn test_parse_json_key() {
        assert_eq!(parse_api_key(r#"{"api_key":"AIzaJson"}"#).unwrap(), "AIzaJson");
        assert_eq!(parse_api_key(r#"{"GEMINI_API_KEY":"AIzaEnv"}"#).unwrap(), "AIzaEnv");
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown_json() {
        assert!(matches!(parse_api_key("   "), Err(Error::Config(_))));
        assert!(matches!(parse_api_key(r#"{"token":"x"}"#), Err(Error::Aws(_))));
    }

    #[tokio::test]
    async fn test_env_key_wins() {
        let config = Config::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("direct".to_string()),
            "GEMINI_API_KEY_SECRET_ARN" => Some("arn:unused".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(resolve_api_key(&config).await.unwrap(), "direct");
    }
}
