//! Gemini HTTP backend implementation
//!
//! Talks to the Generative Language API `generateContent` endpoint. Video
//! references are passed as `fileData` parts so the model can watch the video.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::http_client::HttpClient;
use crate::types::{GenerationClient, GenerationRequest, GenerationResult};
use learnsphere_utils::error::{GenerationError, StopReason};

const PROVIDER_NAME: &str = "gemini";

const API_KEY_HEADER: &str = "x-goog-api-key";

const VIDEO_MIME_TYPE: &str = "video/mp4";

const JSON_MIME_TYPE: &str = "application/json";

#[derive(Clone)]
pub(crate) struct GeminiBackend {
    client: Arc<HttpClient>,
    base_url: String,
    /// `None` when the key variable is unset or empty; reported per request
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiBackend {
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        api_key: Option<String>,
        api_key_env: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = HttpClient::new()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: api_key_env.into(),
        })
    }

    /// Build the backend from configuration, reading the key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, GenerationError> {
        let api_key_env = config.gemini_api_key_env();
        let api_key = std::env::var(api_key_env).ok();
        Self::new(api_key, api_key_env, config.gemini_base_url())
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    fn build_request_body(request: &GenerationRequest) -> GeminiRequest {
        let mut parts = vec![Part::text(&request.prompt)];
        if let Some(video_url) = &request.video_url {
            parts.push(Part::video(video_url));
        }

        GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.wants_json.then(|| JSON_MIME_TYPE.to_string()),
            },
        }
    }
}

/// Classify a decoded response and extract the first candidate's text.
///
/// Checks run in order: blocked prompt, no candidates, abnormal finish reason.
/// A missing finish reason counts as a normal stop.
fn interpret_response(body: GeminiResponse) -> Result<(String, Option<UsageMetadata>), GenerationError> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::BlockedPrompt { reason });
    }

    let Some(first) = body.candidates.into_iter().next() else {
        return Err(GenerationError::NoCandidates);
    };

    match first.finish_reason.as_deref() {
        None | Some("STOP") => {}
        Some("SAFETY") => {
            return Err(GenerationError::AbnormalStop {
                reason: StopReason::Safety,
            });
        }
        Some(other) => {
            return Err(GenerationError::AbnormalStop {
                reason: StopReason::Other(other.to_string()),
            });
        }
    }

    let text = first
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought.unwrap_or(false))
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok((text, body.usage_metadata))
}

#[async_trait]
impl GenerationClient for GeminiBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenerationError::MissingCredential {
                env_var: self.api_key_env.clone(),
            });
        };

        debug!(
            provider = PROVIDER_NAME,
            model = %request.model,
            temperature = request.temperature,
            wants_json = request.wants_json,
            has_video = request.video_url.is_some(),
            timeout_secs = request.timeout.as_secs(),
            "Invoking Gemini backend"
        );

        let request_body = Self::build_request_body(&request);

        let http_request = self
            .client
            .post(&self.endpoint(&request.model))
            .header(API_KEY_HEADER, api_key)
            .header("content-type", "application/json")
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(http_request, request.timeout, PROVIDER_NAME)
            .await?;

        let response_body: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::Transport(format!("Failed to parse Gemini response: {e}"))
        })?;

        let (text, usage) = interpret_response(response_body)?;

        let result = GenerationResult::new(text, PROVIDER_NAME, request.model).with_tokens(
            usage.as_ref().and_then(|u| u.prompt_token_count),
            usage.as_ref().and_then(|u| u.candidates_token_count),
        );

        debug!(
            provider = PROVIDER_NAME,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Gemini invocation completed"
        );

        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            file_data: None,
        }
    }

    fn video(uri: &str) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: VIDEO_MIME_TYPE.to_string(),
                file_uri: uri.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    thought: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}
