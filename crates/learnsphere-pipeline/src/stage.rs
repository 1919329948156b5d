//! The two generation stages
//!
//! Each stage splits into composing a request and postprocessing the raw
//! response, so the pipeline can run either one the same way.

use learnsphere_extraction::{extract_delimited, extract_json_object, extract_string_field};
use learnsphere_llm::GenerationRequest;
use learnsphere_utils::error::ParseError;
use learnsphere_utils::types::StageId;

use crate::prompts::{
    CODE_REGION_CLOSER, CODE_REGION_OPENER, SPEC_ADDENDUM, SPEC_FIELD, SPEC_FROM_VIDEO_PROMPT,
};
use crate::settings::PipelineSettings;

/// A single generation stage
pub trait Stage: Send + Sync {
    fn id(&self) -> StageId;

    /// Build the request sent to the generation client
    fn request(&self, settings: &PipelineSettings) -> GenerationRequest;

    /// Turn the model's raw text into the stage's artifact
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the text does not match the stage's contract.
    fn postprocess(&self, raw: &str) -> Result<String, ParseError>;
}

/// Stage 1: watch the video and describe a learning app
#[derive(Debug, Clone)]
pub struct SpecFromBasis {
    basis: String,
}

impl SpecFromBasis {
    #[must_use]
    pub fn new(basis: impl Into<String>) -> Self {
        Self {
            basis: basis.into(),
        }
    }
}

impl Stage for SpecFromBasis {
    fn id(&self) -> StageId {
        StageId::SpecFromBasis
    }

    fn request(&self, settings: &PipelineSettings) -> GenerationRequest {
        settings
            .request(SPEC_FROM_VIDEO_PROMPT)
            .with_video(self.basis.as_str())
            .expecting_json()
    }

    fn postprocess(&self, raw: &str) -> Result<String, ParseError> {
        let object = extract_json_object(raw)?;
        let mut spec = extract_string_field(&object, SPEC_FIELD)?;
        spec.push_str(SPEC_ADDENDUM);
        Ok(spec)
    }
}

/// Stage 2: implement a spec as a single document
#[derive(Debug, Clone)]
pub struct CodeFromSpec {
    spec: String,
}

impl CodeFromSpec {
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self { spec: spec.into() }
    }
}

impl Stage for CodeFromSpec {
    fn id(&self) -> StageId {
        StageId::CodeFromSpec
    }

    fn request(&self, settings: &PipelineSettings) -> GenerationRequest {
        settings.request(self.spec.as_str())
    }

    fn postprocess(&self, raw: &str) -> Result<String, ParseError> {
        extract_delimited(raw, CODE_REGION_OPENER, CODE_REGION_CLOSER)
    }
}
