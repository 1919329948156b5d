use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use learnsphere_utils::types::ConfigSource;

/// Model used by both generation stages unless overridden
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature used by both generation stages unless overridden
pub const DEFAULT_TEMPERATURE: f32 = 0.75;

/// Per-request timeout in seconds. Video-grounded requests are slow.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_PROVIDER: &str = "gemini";

/// Environment variable the Gemini backend reads its API key from
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub llm: LlmConfig,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    /// Seconds
    pub request_timeout: Option<u64>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            model: Some(DEFAULT_MODEL.to_string()),
            temperature: Some(DEFAULT_TEMPERATURE),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            verbose: Some(false),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider name; only `"gemini"` is supported
    pub provider: Option<String>,
    pub gemini: Option<GeminiConfig>,
}

/// `[llm.gemini]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// Name of the environment variable holding the API key.
    /// The key itself never lives in the config file.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

/// CLI arguments that participate in configuration precedence
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub request_timeout: Option<u64>,
    pub llm_provider: Option<String>,
    pub verbose: Option<bool>,
}

impl Config {
    #[must_use]
    pub fn model(&self) -> String {
        self.defaults
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.defaults.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.defaults
                .request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    #[must_use]
    pub fn gemini_api_key_env(&self) -> &str {
        self.llm
            .gemini
            .as_ref()
            .and_then(|g| g.api_key_env.as_deref())
            .unwrap_or(DEFAULT_API_KEY_ENV)
    }

    #[must_use]
    pub fn gemini_base_url(&self) -> &str {
        self.llm
            .gemini
            .as_ref()
            .and_then(|g| g.base_url.as_deref())
            .unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }
}
