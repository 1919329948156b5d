use std::sync::Arc;

use tracing::debug;

use learnsphere_llm::GenerationClient;
use learnsphere_utils::error::PipelineError;

use crate::settings::PipelineSettings;
use crate::stage::{CodeFromSpec, SpecFromBasis, Stage};

/// Runs generation stages against a shared client.
///
/// The pipeline holds no run state; ordering between stages is the caller's
/// concern. It never retries.
#[derive(Clone)]
pub struct Pipeline {
    client: Arc<dyn GenerationClient>,
    settings: PipelineSettings,
}

impl Pipeline {
    #[must_use]
    pub fn new(client: Arc<dyn GenerationClient>, settings: PipelineSettings) -> Self {
        Self { client, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one stage: compose its request, call the client, postprocess.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Generation` if the client fails and
    /// `PipelineError::Parse` if the response does not fit the stage.
    pub async fn run_stage(&self, stage: &dyn Stage) -> Result<String, PipelineError> {
        let request = stage.request(&self.settings);
        debug!(
            stage = %stage.id(),
            model = %request.model,
            wants_json = request.wants_json,
            has_video = request.video_url.is_some(),
            prompt_chars = request.prompt.chars().count(),
            "Sending generation request"
        );

        let result = self.client.generate(request).await?;
        debug!(
            stage = %stage.id(),
            provider = %result.provider,
            model = %result.model_used,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            response_chars = result.raw_response.chars().count(),
            "Received generation response"
        );

        Ok(stage.postprocess(&result.raw_response)?)
    }

    /// Stage 1: produce a spec (with the addendum) from a video URL
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run_stage`].
    pub async fn spec_from_basis(&self, basis: &str) -> Result<String, PipelineError> {
        self.run_stage(&SpecFromBasis::new(basis)).await
    }

    /// Stage 2: produce the renderable document for a spec
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run_stage`].
    pub async fn code_from_spec(&self, spec: &str) -> Result<String, PipelineError> {
        self.run_stage(&CodeFromSpec::new(spec)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::SPEC_ADDENDUM;
    use learnsphere_llm::test_support::ScriptedClient;
    use learnsphere_utils::error::{GenerationError, ParseError, ParseErrorKind, StopReason};

    fn pipeline_with(client: &Arc<ScriptedClient>) -> Pipeline {
        Pipeline::new(client.clone(), PipelineSettings::default())
    }

    #[tokio::test]
    async fn test_spec_stage_reads_spec_field() {
        let client = Arc::new(ScriptedClient::new());
        client.push_text("```json\n{\"spec\":\"Build a quiz.\"}\n```");

        let spec = pipeline_with(&client)
            .spec_from_basis("https://youtu.be/abc12345678")
            .await
            .unwrap();

        assert_eq!(spec, format!("Build a quiz.{SPEC_ADDENDUM}"));
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].wants_json);
    }

    #[tokio::test]
    async fn test_spec_stage_without_json_is_malformed() {
        let client = Arc::new(ScriptedClient::new());
        client.push_text("Sorry, I cannot help with that.");

        let err = pipeline_with(&client)
            .spec_from_basis("https://youtu.be/abc12345678")
            .await
            .unwrap_err();

        match err {
            PipelineError::Parse(parse) => assert_eq!(parse.kind(), ParseErrorKind::MalformedJson),
            other => panic!("Expected parse failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_code_stage_passes_spec_through_verbatim() {
        let client = Arc::new(ScriptedClient::new());
        client.push_text("<<<CODE>>>\n<html>...</html>\n<<<END>>>");

        let code = pipeline_with(&client).code_from_spec("My spec").await.unwrap();

        assert_eq!(code, "<html>...</html>");
        assert_eq!(client.requests()[0].prompt, "My spec");
    }

    #[tokio::test]
    async fn test_code_stage_missing_markers() {
        let client = Arc::new(ScriptedClient::new());
        client.push_text("<html></html>");

        let err = pipeline_with(&client).code_from_spec("s").await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::Parse(ParseError::DelimiterNotFound {
                marker: "<<<CODE>>>".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_client_error_message_passes_through() {
        let client = Arc::new(ScriptedClient::new());
        client.push_error(GenerationError::AbnormalStop {
            reason: StopReason::Safety,
        });

        let err = pipeline_with(&client).code_from_spec("s").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            GenerationError::AbnormalStop {
                reason: StopReason::Safety
            }
            .to_string()
        );
    }
}
