//! Content state and its transition table

use serde::{Deserialize, Serialize};
use std::fmt;

use learnsphere_utils::error::{ErrorCategory, OrchestratorError, PipelineError};
use learnsphere_utils::types::StageId;

/// Coarse run status exposed to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    LoadingSpec,
    LoadingCode,
    Ready,
    Error,
}

impl RunState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadingSpec => "loading-spec",
            Self::LoadingCode => "loading-code",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    /// True while a generation stage is in flight
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::LoadingSpec | Self::LoadingCode)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failure that put a run into `error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Display text of the stage error, unchanged
    pub message: String,
    pub stage: StageId,
    pub category: ErrorCategory,
}

impl ErrorDetail {
    #[must_use]
    pub fn from_pipeline(stage: StageId, error: &PipelineError) -> Self {
        Self {
            message: error.to_string(),
            stage,
            category: error.category(),
        }
    }
}

/// Pre-existing spec and code to adopt instead of generating
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pub spec: Option<String>,
    pub code: Option<String>,
}

impl Seed {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(spec: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            spec: Some(spec.into()),
            code: Some(code.into()),
        }
    }

    /// Both halves, when both are present and non-empty
    #[must_use]
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (self.spec.as_deref(), self.code.as_deref()) {
            (Some(spec), Some(code)) if !spec.is_empty() && !code.is_empty() => Some((spec, code)),
            _ => None,
        }
    }
}

/// Identity of an activation: the video plus a caller-chosen reload token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationKey {
    pub basis: String,
    pub reload_token: u64,
}

impl ActivationKey {
    #[must_use]
    pub fn new(basis: impl Into<String>, reload_token: u64) -> Self {
        Self {
            basis: basis.into(),
            reload_token,
        }
    }
}

/// Everything a session knows about its content.
///
/// Code exists only in `Ready`; a spec survives a failed code stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    LoadingSpec,
    LoadingCode { spec: String },
    Ready { spec: String, code: String },
    Error { spec: Option<String>, error: ErrorDetail },
}

/// Inputs that move a session between states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SpecGenerated(String),
    CodeGenerated(String),
    StageFailed(ErrorDetail),
    /// A user-edited spec, already trimmed
    EditCommitted(String),
    CodeEdited(String),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::SpecGenerated(_) => "spec-generated",
            Self::CodeGenerated(_) => "code-generated",
            Self::StageFailed(_) => "stage-failed",
            Self::EditCommitted(_) => "edit-commit",
            Self::CodeEdited(_) => "code-edit",
        }
    }
}

impl ContentState {
    #[must_use]
    pub fn initial(seed: &Seed) -> Self {
        match seed.complete() {
            Some((spec, code)) => Self::Ready {
                spec: spec.to_string(),
                code: code.to_string(),
            },
            None => Self::LoadingSpec,
        }
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        match self {
            Self::LoadingSpec => RunState::LoadingSpec,
            Self::LoadingCode { .. } => RunState::LoadingCode,
            Self::Ready { .. } => RunState::Ready,
            Self::Error { .. } => RunState::Error,
        }
    }

    #[must_use]
    pub fn spec(&self) -> Option<&str> {
        match self {
            Self::LoadingSpec => None,
            Self::LoadingCode { spec } | Self::Ready { spec, .. } => Some(spec),
            Self::Error { spec, .. } => spec.as_deref(),
        }
    }

    /// Code, only while `Ready`
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Ready { code, .. } => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Compute the state that follows `event`.
    ///
    /// # Errors
    ///
    /// - `Busy` for user edits while a stage is in flight
    /// - `InvalidTransition` for any other event the current state does not accept
    pub fn apply(&self, event: Event) -> Result<Self, OrchestratorError> {
        match (self, event) {
            (Self::LoadingSpec, Event::SpecGenerated(spec)) => Ok(Self::LoadingCode { spec }),
            (Self::LoadingSpec, Event::StageFailed(error)) => Ok(Self::Error { spec: None, error }),
            (Self::LoadingCode { spec }, Event::CodeGenerated(code)) => Ok(Self::Ready {
                spec: spec.clone(),
                code,
            }),
            (Self::LoadingCode { spec }, Event::StageFailed(error)) => Ok(Self::Error {
                spec: Some(spec.clone()),
                error,
            }),
            (Self::Ready { .. } | Self::Error { .. }, Event::EditCommitted(spec)) => {
                Ok(Self::LoadingCode { spec })
            }
            (Self::Ready { spec, .. }, Event::CodeEdited(code)) => Ok(Self::Ready {
                spec: spec.clone(),
                code,
            }),
            (Self::LoadingSpec | Self::LoadingCode { .. }, Event::EditCommitted(_) | Event::CodeEdited(_)) => {
                Err(OrchestratorError::Busy {
                    state: self.run_state().to_string(),
                })
            }
            (_, event) => Err(OrchestratorError::InvalidTransition {
                operation: event.name().to_string(),
                state: self.run_state().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(stage: StageId) -> ErrorDetail {
        ErrorDetail {
            message: "boom".to_string(),
            stage,
            category: ErrorCategory::Generation,
        }
    }

    #[test]
    fn test_initial_state_from_seed() {
        assert_eq!(ContentState::initial(&Seed::none()), ContentState::LoadingSpec);
        assert_eq!(
            ContentState::initial(&Seed::new("S", "C")).run_state(),
            RunState::Ready
        );
    }

    #[test]
    fn test_partial_or_empty_seed_is_ignored() {
        let partial = Seed {
            spec: Some("S".to_string()),
            code: None,
        };
        assert_eq!(ContentState::initial(&partial), ContentState::LoadingSpec);
        assert_eq!(
            ContentState::initial(&Seed::new("S", "")),
            ContentState::LoadingSpec
        );
    }

    #[test]
    fn test_happy_path() {
        let state = ContentState::LoadingSpec
            .apply(Event::SpecGenerated("S".to_string()))
            .unwrap();
        assert_eq!(state.run_state(), RunState::LoadingCode);
        assert_eq!(state.spec(), Some("S"));
        assert_eq!(state.code(), None);

        let state = state.apply(Event::CodeGenerated("C".to_string())).unwrap();
        assert_eq!(state.run_state(), RunState::Ready);
        assert_eq!(state.code(), Some("C"));
    }

    #[test]
    fn test_spec_failure_has_no_spec() {
        let state = ContentState::LoadingSpec
            .apply(Event::StageFailed(detail(StageId::SpecFromBasis)))
            .unwrap();
        assert_eq!(state.run_state(), RunState::Error);
        assert_eq!(state.spec(), None);
        assert_eq!(state.error().map(|e| e.stage), Some(StageId::SpecFromBasis));
    }

    #[test]
    fn test_code_failure_keeps_spec() {
        let state = ContentState::LoadingCode {
            spec: "S".to_string(),
        }
        .apply(Event::StageFailed(detail(StageId::CodeFromSpec)))
        .unwrap();
        assert_eq!(state.spec(), Some("S"));
        assert_eq!(state.code(), None);
    }

    #[test]
    fn test_edit_commit_from_ready_and_error() {
        let ready = ContentState::Ready {
            spec: "S".to_string(),
            code: "C".to_string(),
        };
        let failed = ContentState::Error {
            spec: None,
            error: detail(StageId::SpecFromBasis),
        };
        for state in [ready, failed] {
            let next = state.apply(Event::EditCommitted("T".to_string())).unwrap();
            assert_eq!(
                next,
                ContentState::LoadingCode {
                    spec: "T".to_string()
                }
            );
        }
    }

    #[test]
    fn test_code_edit_stays_ready() {
        let state = ContentState::Ready {
            spec: "S".to_string(),
            code: "C".to_string(),
        }
        .apply(Event::CodeEdited("D".to_string()))
        .unwrap();
        assert_eq!(state.spec(), Some("S"));
        assert_eq!(state.code(), Some("D"));
    }

    #[test]
    fn test_edits_while_loading_are_busy() {
        let loading = [
            ContentState::LoadingSpec,
            ContentState::LoadingCode {
                spec: "S".to_string(),
            },
        ];
        for state in loading {
            for event in [
                Event::EditCommitted("T".to_string()),
                Event::CodeEdited("D".to_string()),
            ] {
                assert!(matches!(
                    state.apply(event),
                    Err(OrchestratorError::Busy { .. })
                ));
            }
        }
    }

    #[test]
    fn test_code_edit_in_error_is_invalid() {
        let state = ContentState::Error {
            spec: Some("S".to_string()),
            error: detail(StageId::CodeFromSpec),
        };
        assert_eq!(
            state.apply(Event::CodeEdited("D".to_string())),
            Err(OrchestratorError::InvalidTransition {
                operation: "code-edit".to_string(),
                state: "error".to_string(),
            })
        );
    }

    #[test]
    fn test_stage_results_rejected_outside_loading() {
        let ready = ContentState::Ready {
            spec: "S".to_string(),
            code: "C".to_string(),
        };
        assert!(ready.apply(Event::SpecGenerated("x".to_string())).is_err());
        assert!(ready.apply(Event::CodeGenerated("x".to_string())).is_err());
        assert!(
            ContentState::LoadingSpec
                .apply(Event::CodeGenerated("x".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_run_state_strings() {
        assert_eq!(RunState::LoadingSpec.to_string(), "loading-spec");
        assert!(RunState::LoadingCode.is_busy());
        assert!(!RunState::Error.is_busy());
    }
}
