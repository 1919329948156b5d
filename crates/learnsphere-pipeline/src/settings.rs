use std::time::Duration;

use learnsphere_config::{Config, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE};
use learnsphere_llm::GenerationRequest;

/// Model parameters shared by both stages
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model(),
            temperature: config.temperature(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Plain-text request for `prompt` carrying these settings
    #[must_use]
    pub fn request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(self.model.as_str(), prompt)
            .with_temperature(self.temperature)
            .with_timeout(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_follows_config_values() {
        let config = Config::builder()
            .model("gemini-2.5-pro")
            .temperature(0.2)
            .request_timeout(Duration::from_secs(45))
            .build()
            .unwrap();
        let settings = PipelineSettings::from_config(&config);

        let request = settings.request("hello");
        assert_eq!(request.model, "gemini-2.5-pro");
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.timeout, Duration::from_secs(45));
    }
}
