//! Two-stage content generation
//!
//! Stage 1 ([`SpecFromBasis`]) turns a video URL into a learning-app spec.
//! Stage 2 ([`CodeFromSpec`]) turns a spec into a self-contained HTML
//! document. [`Pipeline`] runs either stage against a [`GenerationClient`].
//!
//! [`GenerationClient`]: learnsphere_llm::GenerationClient

mod pipeline;
pub mod prompts;
mod settings;
mod stage;

pub use learnsphere_utils::error::PipelineError;
pub use pipeline::Pipeline;
pub use settings::PipelineSettings;
pub use stage::{CodeFromSpec, SpecFromBasis, Stage};
