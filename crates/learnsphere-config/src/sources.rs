use std::collections::HashMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> String {
    source.unwrap_or(&ConfigSource::Defaults).label().to_string()
}

impl Config {
    /// Effective configuration as `key -> (value, source)` pairs
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();

        let mut add_config = |key: &str, attribution_key: &str, value: String| {
            let source = source_label(self.source_attribution.get(attribution_key));
            config.insert(key.to_string(), (value, source));
        };

        add_config("model", "model", self.model());
        add_config("temperature", "temperature", self.temperature().to_string());
        add_config(
            "request_timeout",
            "request_timeout",
            format!("{}s", self.request_timeout().as_secs()),
        );
        add_config("verbose", "verbose", self.verbose().to_string());
        add_config("llm_provider", "llm_provider", self.provider().to_string());
        add_config(
            "llm_gemini_api_key_env",
            "llm_gemini",
            self.gemini_api_key_env().to_string(),
        );
        add_config(
            "llm_gemini_base_url",
            "llm_gemini",
            self.gemini_base_url().to_string(),
        );

        config
    }
}
