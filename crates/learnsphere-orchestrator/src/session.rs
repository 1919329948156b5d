//! One activation's run of the content pipeline

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::Instrument;

use learnsphere_pipeline::{CodeFromSpec, Pipeline, SpecFromBasis, Stage};
use learnsphere_utils::error::OrchestratorError;
use learnsphere_utils::logging::{
    log_stage_complete, log_stage_error, log_stage_start, log_stale_result, stage_span,
};
use learnsphere_utils::types::StageId;

use crate::edit::EditSession;
use crate::observer::{ObserverHub, StateSnapshot};
use crate::state::{ActivationKey, ContentState, ErrorDetail, Event, RunState, Seed};

/// Result of committing an edited spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The trimmed text matched the current spec; nothing happened
    Unchanged,
    /// Code was regenerated from the new spec, ending in this state
    Regenerated(RunState),
}

/// A single activation.
///
/// Every state change first checks that this session still holds the
/// current generation token. Once a newer activation exists, results and
/// edits are rejected with `Superseded` and observers never hear from this
/// session again.
pub struct ContentSession {
    token: u64,
    key: ActivationKey,
    seed: Seed,
    pipeline: Pipeline,
    hub: Arc<ObserverHub>,
    state: Mutex<ContentState>,
    started: AtomicBool,
}

impl ContentSession {
    pub(crate) fn new(
        token: u64,
        key: ActivationKey,
        seed: &Seed,
        pipeline: Pipeline,
        hub: Arc<ObserverHub>,
    ) -> Self {
        Self {
            token,
            key,
            seed: seed.clone(),
            pipeline,
            hub,
            state: Mutex::new(ContentState::initial(seed)),
            started: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    #[must_use]
    pub fn key(&self) -> &ActivationKey {
        &self.key
    }

    /// The seed this session was activated with
    #[must_use]
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.hub.current_generation() == self.token
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.lock_state().run_state()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.run_state().is_busy()
    }

    #[must_use]
    pub fn spec(&self) -> Option<String> {
        self.lock_state().spec().map(ToString::to_string)
    }

    /// Code, only while `ready`
    #[must_use]
    pub fn code(&self) -> Option<String> {
        self.lock_state().code().map(ToString::to_string)
    }

    #[must_use]
    pub fn error(&self) -> Option<ErrorDetail> {
        self.lock_state().error().cloned()
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(self.token, &self.key.basis, &self.lock_state())
    }

    /// Drive the pipeline: spec from the video, then code from the spec.
    ///
    /// A seeded session is already `ready` and makes no model call. Calling
    /// `run` again after the first call returns the current state.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` if a newer activation replaced this session.
    /// Stage failures are not errors here; they end the run in `error`.
    pub async fn run(&self) -> Result<RunState, OrchestratorError> {
        self.ensure_current()?;
        if self.started.swap(true, Ordering::SeqCst) || self.run_state() != RunState::LoadingSpec {
            return Ok(self.run_state());
        }

        let after_spec = self
            .execute_stage(&SpecFromBasis::new(self.key.basis.as_str()))
            .await?;
        if after_spec != RunState::LoadingCode {
            return Ok(after_spec);
        }

        let spec = self.spec().unwrap_or_default();
        self.execute_stage(&CodeFromSpec::new(spec)).await
    }

    /// Replace the spec with `text` and regenerate the code from it.
    ///
    /// The text is trimmed first. If it equals the current spec (an absent
    /// spec counts as empty) nothing happens and no model call is made. The
    /// addendum is not appended again.
    ///
    /// # Errors
    ///
    /// - `Superseded` if a newer activation replaced this session
    /// - `Busy` while a stage is in flight
    pub async fn commit_spec_edit(&self, text: &str) -> Result<EditOutcome, OrchestratorError> {
        let trimmed = text.trim();
        let applied = self.transition_with(|state| {
            if !state.run_state().is_busy() && state.spec().unwrap_or_default() == trimmed {
                None
            } else {
                Some(Event::EditCommitted(trimmed.to_string()))
            }
        })?;

        if applied.is_none() {
            tracing::debug!(generation = self.token, "Spec edit matches current spec; skipping");
            return Ok(EditOutcome::Unchanged);
        }

        let state = self.execute_stage(&CodeFromSpec::new(trimmed)).await?;
        Ok(EditOutcome::Regenerated(state))
    }

    /// Overwrite the code directly. Only allowed in `ready`; no model call.
    ///
    /// # Errors
    ///
    /// - `Superseded` if a newer activation replaced this session
    /// - `Busy` while a stage is in flight
    /// - `InvalidTransition` in `error`
    pub fn edit_code(&self, text: &str) -> Result<RunState, OrchestratorError> {
        self.transition(Event::CodeEdited(text.to_string()))
    }

    /// Open an edit buffer seeded with the current spec.
    ///
    /// # Errors
    ///
    /// - `Superseded` if a newer activation replaced this session
    /// - `Busy` while a stage is in flight
    pub fn begin_edit(self: &Arc<Self>) -> Result<EditSession, OrchestratorError> {
        self.ensure_current()?;
        let state = self.lock_state();
        if state.run_state().is_busy() {
            return Err(OrchestratorError::Busy {
                state: state.run_state().to_string(),
            });
        }
        let text = state.spec().unwrap_or_default().to_string();
        drop(state);
        Ok(EditSession::new(Arc::clone(self), text))
    }

    async fn execute_stage(&self, stage: &dyn Stage) -> Result<RunState, OrchestratorError> {
        let stage_id = stage.id();
        let span = stage_span(self.token, stage_id);

        let event = async {
            log_stage_start(self.token, stage_id);
            let started = Instant::now();
            match self.pipeline.run_stage(stage).await {
                Ok(artifact) => {
                    log_stage_complete(self.token, stage_id, started.elapsed().as_millis());
                    match stage_id {
                        StageId::SpecFromBasis => Event::SpecGenerated(artifact),
                        StageId::CodeFromSpec => Event::CodeGenerated(artifact),
                    }
                }
                Err(err) => {
                    // A superseded session's failure is reported by the stale-result line only
                    if self.is_current() {
                        log_stage_error(
                            self.token,
                            stage_id,
                            &err.to_string(),
                            started.elapsed().as_millis(),
                        );
                    }
                    Event::StageFailed(ErrorDetail::from_pipeline(stage_id, &err))
                }
            }
        }
        .instrument(span)
        .await;

        self.transition(event).inspect_err(|err| {
            if let OrchestratorError::Superseded { current, .. } = err {
                log_stale_result(self.token, *current, stage_id);
            }
        })
    }

    fn transition(&self, event: Event) -> Result<RunState, OrchestratorError> {
        self.transition_with(|_| Some(event))
            .map(|applied| applied.unwrap_or_else(|| self.run_state()))
    }

    /// Apply the event chosen by `decide`, if any, and notify observers.
    ///
    /// Returns the new run state, or `None` when `decide` chose no event.
    fn transition_with(
        &self,
        decide: impl FnOnce(&ContentState) -> Option<Event>,
    ) -> Result<Option<RunState>, OrchestratorError> {
        let mut state = self.lock_state();
        let gate = self.hub.lock();
        self.ensure_current()?;

        let Some(event) = decide(&state) else {
            return Ok(None);
        };
        let next = state.apply(event)?;
        *state = next;

        gate.publish(StateSnapshot::capture(self.token, &self.key.basis, &state));
        Ok(Some(state.run_state()))
    }

    fn ensure_current(&self) -> Result<(), OrchestratorError> {
        let current = self.hub.current_generation();
        if current == self.token {
            Ok(())
        } else {
            Err(OrchestratorError::Superseded {
                token: self.token,
                current,
            })
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ContentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
