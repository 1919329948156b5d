//! The long-lived owner of the current content session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use learnsphere_config::Config;
use learnsphere_llm::GenerationClient;
use learnsphere_pipeline::{Pipeline, PipelineSettings};
use learnsphere_utils::error::{GenerationError, OrchestratorError};

use crate::observer::{ObserverHub, StateObserver, StateSnapshot};
use crate::session::{ContentSession, EditOutcome};
use crate::state::{ActivationKey, RunState, Seed};

/// Hands out content sessions, one per activation.
///
/// Activating with a new key or seed replaces the current session wholesale;
/// the old session keeps running to completion but its results are
/// discarded. Activating again with the key and seed of the current session
/// returns that session unchanged.
///
/// ```rust,no_run
/// use learnsphere_config::Config;
/// use learnsphere_orchestrator::{ActivationKey, ContentOrchestrator, Seed};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let orchestrator = ContentOrchestrator::from_config(&Config::builder().build()?)?;
/// let session = orchestrator.activate(ActivationKey::new("https://youtu.be/abc12345678", 0), &Seed::none());
/// session.run().await?;
/// println!("{:?}", orchestrator.code());
/// # Ok(())
/// # }
/// ```
pub struct ContentOrchestrator {
    pipeline: Pipeline,
    hub: Arc<ObserverHub>,
    current: Mutex<Option<Arc<ContentSession>>>,
}

impl ContentOrchestrator {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            hub: Arc::new(ObserverHub::new()),
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_client(client: Arc<dyn GenerationClient>, settings: PipelineSettings) -> Self {
        Self::new(Pipeline::new(client, settings))
    }

    /// Build the configured generation client and pipeline settings.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the configured provider cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client: Arc<dyn GenerationClient> = Arc::from(learnsphere_llm::from_config(config)?);
        Ok(Self::with_client(client, PipelineSettings::from_config(config)))
    }

    /// Register an observer for every applied transition of the live session
    pub fn add_observer(&self, observer: Arc<dyn StateObserver>) {
        self.hub.add_observer(observer);
    }

    /// Watch the latest snapshot; `None` until the first activation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<StateSnapshot>> {
        self.hub.subscribe()
    }

    /// Start (or rejoin) the session for `key` and `seed`.
    ///
    /// A complete seed puts the new session straight into `ready`. The caller
    /// drives generation with [`ContentSession::run`].
    pub fn activate(&self, key: ActivationKey, seed: &Seed) -> Arc<ContentSession> {
        let mut current = self.lock_current();
        if let Some(session) = current.as_ref()
            && session.key() == &key
            && session.seed() == seed
        {
            return Arc::clone(session);
        }

        let gate = self.hub.lock();
        let token = self.hub.advance(&gate);
        let session = Arc::new(ContentSession::new(
            token,
            key,
            seed,
            self.pipeline.clone(),
            Arc::clone(&self.hub),
        ));
        tracing::debug!(
            generation = token,
            basis = %session.key().basis,
            reload_token = session.key().reload_token,
            seeded = seed.complete().is_some(),
            "Activated content session"
        );
        gate.publish(session.snapshot());
        drop(gate);

        *current = Some(Arc::clone(&session));
        session
    }

    #[must_use]
    pub fn session(&self) -> Option<Arc<ContentSession>> {
        self.lock_current().clone()
    }

    #[must_use]
    pub fn run_state(&self) -> Option<RunState> {
        self.session().map(|s| s.run_state())
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.session().is_some_and(|s| s.is_busy())
    }

    #[must_use]
    pub fn spec(&self) -> Option<String> {
        self.session().and_then(|s| s.spec())
    }

    /// Code of the current session, only while it is `ready`
    #[must_use]
    pub fn code(&self) -> Option<String> {
        self.session().and_then(|s| s.code())
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<StateSnapshot> {
        self.session().map(|s| s.snapshot())
    }

    /// Commit a spec edit on the current session
    ///
    /// # Errors
    ///
    /// `NoActiveSession` before the first activation, otherwise see
    /// [`ContentSession::commit_spec_edit`].
    pub async fn commit_spec_edit(&self, text: &str) -> Result<EditOutcome, OrchestratorError> {
        let session = self.session().ok_or(OrchestratorError::NoActiveSession)?;
        session.commit_spec_edit(text).await
    }

    /// Overwrite the code of the current session
    ///
    /// # Errors
    ///
    /// `NoActiveSession` before the first activation, otherwise see
    /// [`ContentSession::edit_code`].
    pub fn edit_code(&self, text: &str) -> Result<RunState, OrchestratorError> {
        let session = self.session().ok_or(OrchestratorError::NoActiveSession)?;
        session.edit_code(text)
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Arc<ContentSession>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
