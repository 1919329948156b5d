use learnsphere_utils::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(model) = &self.defaults.model
            && model.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "model".to_string(),
                value: "must not be empty".to_string(),
            });
        }

        if let Some(temperature) = self.defaults.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ConfigError::InvalidValue {
                key: "temperature".to_string(),
                value: format!("{temperature} is outside the range 0.0 to 2.0"),
            });
        }

        if let Some(timeout) = self.defaults.request_timeout {
            if timeout < 5 {
                return Err(ConfigError::InvalidValue {
                    key: "request_timeout".to_string(),
                    value: "must be at least 5 seconds".to_string(),
                });
            }
            if timeout > 3600 {
                return Err(ConfigError::InvalidValue {
                    key: "request_timeout".to_string(),
                    value: "exceeds maximum limit of 3600 seconds (1 hour)".to_string(),
                });
            }
        }

        if let Some(provider) = &self.llm.provider
            && provider.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "llm_provider".to_string(),
                value: "must not be empty".to_string(),
            });
        }

        if let Some(gemini) = &self.llm.gemini {
            if let Some(env_name) = &gemini.api_key_env
                && env_name.trim().is_empty()
            {
                return Err(ConfigError::InvalidValue {
                    key: "llm.gemini.api_key_env".to_string(),
                    value: "must name an environment variable".to_string(),
                });
            }
            if let Some(base_url) = &gemini.base_url
                && !base_url.starts_with("https://")
                && !base_url.starts_with("http://")
            {
                return Err(ConfigError::InvalidValue {
                    key: "llm.gemini.base_url".to_string(),
                    value: format!("{base_url} is not an http(s) URL"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Defaults, GeminiConfig, LlmConfig};
    use std::collections::HashMap;

    fn config_with(defaults: Defaults, llm: LlmConfig) -> Config {
        Config {
            defaults,
            llm,
            source_attribution: HashMap::new(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = config_with(Defaults::default(), LlmConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        for (timeout, ok) in [(4, false), (5, true), (3600, true), (3601, false)] {
            let defaults = Defaults {
                request_timeout: Some(timeout),
                ..Defaults::default()
            };
            let config = config_with(defaults, LlmConfig::default());
            assert_eq!(config.validate().is_ok(), ok, "timeout {timeout}");
        }
    }

    #[test]
    fn test_empty_model_rejected() {
        let defaults = Defaults {
            model: Some("  ".to_string()),
            ..Defaults::default()
        };
        let err = config_with(defaults, LlmConfig::default())
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "model"));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let llm = LlmConfig {
            provider: Some("gemini".to_string()),
            gemini: Some(GeminiConfig {
                api_key_env: None,
                base_url: Some("ftp://example.com".to_string()),
            }),
        };
        assert!(config_with(Defaults::default(), llm).validate().is_err());
    }
}
