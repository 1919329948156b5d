//! learnsphere - turn a video into an interactive learning app
//!
//! Two model calls do the work. The first watches the video and writes a
//! natural-language spec for a small learning app. The second implements that
//! spec as a single self-contained HTML document. Users can edit the spec,
//! which regenerates only the document, or edit the document directly.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export API_KEY=...
//! learnsphere generate https://youtu.be/abc12345678 --emit both
//!
//! # Regenerate the document from a hand-edited spec
//! learnsphere code my-spec.txt > app.html
//!
//! # Show effective configuration and where each value came from
//! learnsphere config
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use learnsphere::{ActivationKey, Config, ContentOrchestrator, Seed};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder().build()?;
//! let orchestrator = ContentOrchestrator::from_config(&config)?;
//! let session = orchestrator.activate(ActivationKey::new("https://youtu.be/abc12345678", 0), &Seed::none());
//! session.run().await?;
//! if let Some(html) = orchestrator.code() {
//!     println!("{html}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! - [`utils`]: errors, exit codes, logging, credential redaction
//! - [`config`]: configuration discovery and validation
//! - [`llm`]: the generation client trait and the Gemini backend
//! - [`extraction`]: parsers for model output
//! - [`pipeline`]: the two generation stages
//! - [`orchestrator`]: the content state machine

pub use learnsphere_config as config;
pub use learnsphere_extraction as extraction;
pub use learnsphere_llm as llm;
pub use learnsphere_orchestrator as orchestrator;
pub use learnsphere_pipeline as pipeline;
pub use learnsphere_utils as utils;

pub use learnsphere_config::{CliArgs, Config, ConfigBuilder};
pub use learnsphere_orchestrator::{
    ActivationKey, ContentOrchestrator, ContentSession, EditOutcome, RunState, Seed,
    StateObserver, StateSnapshot,
};
pub use learnsphere_utils::error::{LearnSphereError, UserFriendlyError};
pub use learnsphere_utils::exit_codes::ExitCode;

pub mod cli;
