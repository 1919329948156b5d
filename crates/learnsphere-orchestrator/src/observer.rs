//! Observer notification and supersession bookkeeping

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::state::{ContentState, ErrorDetail, RunState};

/// Point-in-time view of a session, as delivered to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Token of the session this snapshot describes
    pub generation: u64,
    pub basis: String,
    pub run_state: RunState,
    pub is_busy: bool,
    pub spec: Option<String>,
    /// Present only in `ready`
    pub code: Option<String>,
    pub error: Option<ErrorDetail>,
}

impl StateSnapshot {
    #[must_use]
    pub fn capture(generation: u64, basis: &str, state: &ContentState) -> Self {
        let run_state = state.run_state();
        Self {
            generation,
            basis: basis.to_string(),
            run_state,
            is_busy: run_state.is_busy(),
            spec: state.spec().map(ToString::to_string),
            code: state.code().map(ToString::to_string),
            error: state.error().cloned(),
        }
    }
}

/// Receives every applied transition of the live session.
///
/// Called synchronously while the transition is being applied; an
/// implementation must not call back into the orchestrator.
pub trait StateObserver: Send + Sync {
    fn on_transition(&self, snapshot: &StateSnapshot);
}

/// Shared between the orchestrator and its sessions.
///
/// Holding `gate` serializes "is this session current" checks against
/// activations, so a superseded session can never publish after its successor.
pub(crate) struct ObserverHub {
    generation: AtomicU64,
    gate: Mutex<HubInner>,
}

pub(crate) struct HubInner {
    observers: Vec<Arc<dyn StateObserver>>,
    /// `None` until the first activation
    latest: watch::Sender<Option<StateSnapshot>>,
}

impl ObserverHub {
    pub(crate) fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            generation: AtomicU64::new(0),
            gate: Mutex::new(HubInner {
                observers: Vec::new(),
                latest,
            }),
        }
    }

    pub(crate) fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new generation; the caller holds the gate
    pub(crate) fn advance(&self, _gate: &MutexGuard<'_, HubInner>) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn add_observer(&self, observer: Arc<dyn StateObserver>) {
        self.lock().observers.push(observer);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<StateSnapshot>> {
        self.lock().latest.subscribe()
    }
}

impl HubInner {
    /// Deliver a snapshot to every observer, in registration order
    pub(crate) fn publish(&self, snapshot: StateSnapshot) {
        for observer in &self.observers {
            observer.on_transition(&snapshot);
        }
        self.latest.send_replace(Some(snapshot));
    }
}
