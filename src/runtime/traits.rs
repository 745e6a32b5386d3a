//! Trait abstractions for runtime I/O
//!
//! Handlers only see these capabilities, which lets the router be driven
//! by mock implementations in tests.

use super::SessionUpdate;
use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService};
use crate::state_machine::state::{Role, Turn};
use crate::state_machine::{Event, RenderInstruction, Renderer, SessionId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// A completion call that did not produce usable text. Always recoverable:
/// the user gets an apology and may retry.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("completion failed: {0}")]
    Llm(#[from] LlmError),
    #[error("completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("completion returned no text")]
    EmptyCompletion,
}

/// Single request/response text generation
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// `prior_turns` is the conversation window, oldest first; the user
    /// message is sent after it.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError> {
        (**self)
            .complete(system_prompt, user_message, prior_turns)
            .await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use an `LlmService` as `CompletionClient`, with a bounded wait
pub struct LlmCompletionClient {
    llm: Arc<dyn LlmService>,
    temperature: f32,
    timeout: Duration,
}

impl LlmCompletionClient {
    pub fn new(llm: Arc<dyn LlmService>, temperature: f32, timeout: Duration) -> Self {
        Self {
            llm,
            temperature,
            timeout,
        }
    }

    fn build_request(&self, system_prompt: &str, user_message: &str, prior: &[Turn]) -> LlmRequest {
        let mut messages: Vec<LlmMessage> = prior
            .iter()
            .map(|turn| match turn.role {
                Role::User => LlmMessage::user(turn.text.clone()),
                Role::Assistant => LlmMessage::assistant(turn.text.clone()),
            })
            .collect();
        messages.push(LlmMessage::user(user_message));

        LlmRequest {
            system: Some(system_prompt.to_string()),
            messages,
            max_tokens: None,
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl CompletionClient for LlmCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError> {
        let request = self.build_request(system_prompt, user_message, prior_turns);

        let response = tokio::time::timeout(self.timeout, self.llm.complete(&request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))??;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(UpstreamError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}

/// Renderer that publishes to a session's update stream
pub struct BroadcastRenderer {
    session_id: SessionId,
    tx: broadcast::Sender<SessionUpdate>,
}

impl BroadcastRenderer {
    pub fn new(session_id: SessionId, tx: broadcast::Sender<SessionUpdate>) -> Self {
        Self { session_id, tx }
    }
}

impl Renderer for BroadcastRenderer {
    fn acknowledge(&self, event: &Event) {
        // No subscribers is normal; the final render still goes back to the caller
        let _ = self.tx.send(SessionUpdate::Acknowledged { event: event.kind() });
    }

    fn notice(&self, instruction: RenderInstruction) {
        tracing::debug!(session_id = %self.session_id, text = %instruction.text, "Progress notice");
        let _ = self.tx.send(SessionUpdate::Notice {
            render: instruction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmErrorKind, LlmResponse, Usage};
    use std::sync::Mutex;

    /// Scripted `LlmService` that records what it was asked
    struct ScriptedLlm {
        reply: String,
        delay: Duration,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedLlm {
        fn new(reply: &str, delay: Duration) -> Self {
            Self {
                reply: reply.to_string(),
                delay,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmService for ScriptedLlm {
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            if self.reply == "!auth" {
                return Err(LlmError::auth("bad key"));
            }
            Ok(LlmResponse {
                text: self.reply.clone(),
                end_turn: true,
                usage: Usage::default(),
            })
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn client(llm: &Arc<ScriptedLlm>, timeout: Duration) -> LlmCompletionClient {
        LlmCompletionClient::new(llm.clone(), 0.8, timeout)
    }

    #[tokio::test]
    async fn test_prior_turns_precede_user_message() {
        let llm = Arc::new(ScriptedLlm::new("  answer \n", Duration::ZERO));
        let prior = vec![Turn::user("q1"), Turn::assistant("a1")];
        let text = client(&llm, Duration::from_secs(1))
            .complete("system", "q2", &prior)
            .await
            .unwrap();
        assert_eq!(text, "answer");

        let seen = llm.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.system.as_deref(), Some("system"));
        let texts: Vec<&str> = request.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["q1", "a1", "q2"]);
        assert!(request.temperature.is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let llm = Arc::new(ScriptedLlm::new("late", Duration::from_secs(5)));
        let err = client(&llm, Duration::from_millis(20))
            .complete("s", "u", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_blank_reply_is_upstream_error() {
        let llm = Arc::new(ScriptedLlm::new("   ", Duration::ZERO));
        let err = client(&llm, Duration::from_secs(1))
            .complete("s", "u", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped() {
        let llm = Arc::new(ScriptedLlm::new("!auth", Duration::ZERO));
        let err = client(&llm, Duration::from_secs(1))
            .complete("s", "u", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Llm(ref e) if e.kind == LlmErrorKind::Auth));
    }

    #[test]
    fn test_broadcast_renderer_publishes() {
        let (tx, mut rx) = broadcast::channel(8);
        let renderer = BroadcastRenderer::new(SessionId::new("s"), tx);
        renderer.acknowledge(&Event::Cancel);
        renderer.notice(RenderInstruction::text("working"));

        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionUpdate::Acknowledged { ref event } if event == "cancel"
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionUpdate::Notice { ref render } if render.text == "working"
        ));
    }
}
