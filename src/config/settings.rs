//! Configuration settings for Parley.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub api: ApiSettings,
    pub chat: ChatSettings,
    pub web: WebSettings,
    pub data: DataSettings,
}

/// Chat completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Request timeout for endpoint calls.
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.x.ai/v1".to_string(),
            api_key_env: "XAI_API_KEY".to_string(),
            model: "grok-4".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Sampling settings for plain chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Settings for the web research tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// User-Agent header sent with every outbound fetch.
    pub user_agent: String,
    /// Timeout for page fetches and searches.
    pub fetch_timeout_seconds: u64,
    /// Timeout for HEAD probes during competitor analysis.
    pub probe_timeout_seconds: u64,
    /// Maximum characters of page text returned to the model.
    pub max_content_chars: usize,
    /// Maximum number of links returned per page.
    pub max_links: usize,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            fetch_timeout_seconds: 10,
            probe_timeout_seconds: 5,
            max_content_chars: 5000,
            max_links: 10,
        }
    }
}

/// Settings for the sample sales database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Seed for the sample data generator.
    pub seed: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> crate::error::Result<String> {
        Self::api_key_from_env(&self.api.api_key_env)
    }

    /// Read an API key from the named environment variable.
    pub fn api_key_from_env(var: &str) -> crate::error::Result<String> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(crate::error::ParleyError::Config(format!(
                "{} is empty. Set it with: export {}='xai-...' or add it to .env",
                var, var
            ))),
            Err(_) => Err(crate::error::ParleyError::Config(format!(
                "{} not set. Set it with: export {}='xai-...' or add it to .env",
                var, var
            ))),
        }
    }
}
