//! Content orchestration
//!
//! A [`ContentOrchestrator`] owns the current [`ContentSession`]. Each
//! session walks `loading-spec → loading-code → ready`, or stops in `error`,
//! and accepts user edits of the spec (regenerating the code) or of the code
//! (no regeneration). A newer activation supersedes the current session:
//! late results from the old one are discarded and never reach observers.

mod edit;
mod observer;
mod orchestrator;
mod session;
mod state;

pub use edit::EditSession;
pub use learnsphere_utils::error::OrchestratorError;
pub use observer::{StateObserver, StateSnapshot};
pub use orchestrator::ContentOrchestrator;
pub use session::{ContentSession, EditOutcome};
pub use state::{ActivationKey, ContentState, ErrorDetail, Event, RunState, Seed};
