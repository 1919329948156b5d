//! Core types for the generation client abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use learnsphere_utils::error::GenerationError;

/// Sampling temperature used when a request does not set one
pub const DEFAULT_TEMPERATURE: f32 = 0.75;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Input to a single generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    /// Video the model should ground its answer on
    pub video_url: Option<String>,
    pub temperature: f32,
    /// Ask the provider for a JSON response body
    pub wants_json: bool,
    pub timeout: Duration,
}

impl GenerationRequest {
    /// Plain-text request with the default temperature and timeout
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            video_url: None,
            temperature: DEFAULT_TEMPERATURE,
            wants_json: false,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_video(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = Some(video_url.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn expecting_json(mut self) -> Self {
        self.wants_json = true;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Result of a successful generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Text of the first candidate
    pub raw_response: String,
    /// Provider name (e.g. "gemini")
    pub provider: String,
    pub model_used: String,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
}

impl GenerationResult {
    #[must_use]
    pub fn new(
        raw_response: impl Into<String>,
        provider: impl Into<String>,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            raw_response: raw_response.into(),
            provider: provider.into(),
            model_used: model_used.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, input: Option<u64>, output: Option<u64>) -> Self {
        self.tokens_input = input;
        self.tokens_output = output;
        self
    }
}

/// Trait for generation client implementations
///
/// The pipeline reaches the model only through this trait. Implementations
/// never retry at this level; HTTP adapters may retry transport failures
/// internally.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate text for the given request
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` for any failure, including:
    /// - Missing credentials
    /// - Prompt blocked by content policy
    /// - No candidates, or a candidate stopped abnormally
    /// - Transport failures, provider errors, timeouts
    async fn generate(&self, request: GenerationRequest)
    -> Result<GenerationResult, GenerationError>;
}
