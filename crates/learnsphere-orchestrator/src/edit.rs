//! Working copy of the spec while the user composes an edit

use std::sync::Arc;

use learnsphere_utils::error::OrchestratorError;

use crate::session::{ContentSession, EditOutcome};

/// An uncommitted spec edit.
///
/// Nothing in the session changes until [`EditSession::commit`]. Dropping or
/// cancelling the edit discards the buffer.
pub struct EditSession {
    session: Arc<ContentSession>,
    buffer: String,
}

impl EditSession {
    pub(crate) fn new(session: Arc<ContentSession>, buffer: String) -> Self {
        Self { session, buffer }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Discard the buffer without touching the session
    pub fn cancel(self) {}

    /// Commit the buffer as the new spec
    ///
    /// # Errors
    ///
    /// See [`ContentSession::commit_spec_edit`].
    pub async fn commit(self) -> Result<EditOutcome, OrchestratorError> {
        self.session.commit_spec_edit(&self.buffer).await
    }
}
