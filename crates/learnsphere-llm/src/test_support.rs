//! Scripted generation client for tests
//!
//! Replies are consumed in order. A gated reply parks the caller until the
//! test releases it, which lets tests interleave activations deterministically.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::types::{GenerationClient, GenerationRequest, GenerationResult};
use learnsphere_utils::error::GenerationError;

type Reply = Result<String, GenerationError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// A [`GenerationClient`] that answers from a queue and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Scripted::Ready(Ok(text.into())));
    }

    /// Queue a failing reply
    pub fn push_error(&self, error: GenerationError) {
        self.push(Scripted::Ready(Err(error)));
    }

    /// Queue a reply that completes only when the returned sender fires
    pub fn push_gated(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(Scripted::Gated(rx));
        tx
    }

    /// Requests received so far, in call order
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn push(&self, reply: Scripted) {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let model = request.model.clone();
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request);

        let next = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();

        let reply = match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(GenerationError::Transport(
                    "scripted reply was dropped".to_string(),
                ))
            }),
            None => Err(GenerationError::Transport(
                "no scripted reply left".to_string(),
            )),
        };

        reply.map(|text| GenerationResult::new(text, "scripted", model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_and_records_requests() {
        let client = ScriptedClient::new();
        client.push_text("one");
        client.push_error(GenerationError::NoCandidates);

        let first = client
            .generate(GenerationRequest::new("m", "p1"))
            .await
            .unwrap();
        assert_eq!(first.raw_response, "one");

        let second = client.generate(GenerationRequest::new("m", "p2")).await;
        assert_eq!(second.unwrap_err(), GenerationError::NoCandidates);

        let prompts: Vec<_> = client.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, ["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_gated_reply_waits_for_release() {
        let client = std::sync::Arc::new(ScriptedClient::new());
        let gate = client.push_gated();

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.generate(GenerationRequest::new("m", "p")).await }
        });

        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.send(Ok("late".to_string())).unwrap();
        let result = task.await.unwrap().unwrap();
        assert_eq!(result.raw_response, "late");
    }

    #[tokio::test]
    async fn test_exhausted_script_is_transport_error() {
        let client = ScriptedClient::new();
        let err = client
            .generate(GenerationRequest::new("m", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }
}
