use std::collections::HashMap;
use std::time::Duration;

use learnsphere_utils::error::ConfigError;

use super::{Config, ConfigSource, Defaults, GeminiConfig, LlmConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use learnsphere_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .model("gemini-2.5-pro")
    ///     .request_timeout(Duration::from_secs(120))
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.model(), "gemini-2.5-pro");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builds a `Config` without consulting files or the environment.
///
/// Values set through the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    verbose: Option<bool>,
    provider: Option<String>,
    api_key_env: Option<String>,
    base_url: Option<String>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` when a value is out of range.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut llm = LlmConfig {
            provider: Some(super::DEFAULT_PROVIDER.to_string()),
            gemini: Some(GeminiConfig::default()),
        };

        for key in ["model", "temperature", "request_timeout", "verbose", "llm_provider"] {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        if let Some(model) = self.model {
            defaults.model = Some(model);
            source_attribution.insert("model".to_string(), ConfigSource::Programmatic);
        }
        if let Some(temperature) = self.temperature {
            defaults.temperature = Some(temperature);
            source_attribution.insert("temperature".to_string(), ConfigSource::Programmatic);
        }
        if let Some(timeout) = self.request_timeout {
            defaults.request_timeout = Some(timeout.as_secs());
            source_attribution.insert("request_timeout".to_string(), ConfigSource::Programmatic);
        }
        if let Some(verbose) = self.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Programmatic);
        }
        if let Some(provider) = self.provider {
            llm.provider = Some(provider);
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Programmatic);
        }
        if self.api_key_env.is_some() || self.base_url.is_some() {
            llm.gemini = Some(GeminiConfig {
                api_key_env: self.api_key_env,
                base_url: self.base_url,
            });
            source_attribution.insert("llm_gemini".to_string(), ConfigSource::Programmatic);
        }

        let config = Config {
            defaults,
            llm,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }
}
