//! OpenAI-compatible client configuration.

use crate::config::ApiSettings;
use crate::error::{ParleyError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured endpoint.
///
/// The API key is passed in explicitly so a missing credential is reported
/// before the client exists.
pub fn create_client(api: &ApiSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api, api_key, Duration::from_secs(api.timeout_seconds))
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    api: &ApiSettings,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ParleyError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(&api.base_url)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
