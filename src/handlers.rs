//! Mode handlers
//!
//! One stateless handler per mode. All per-call context (resources, the
//! completion client, the progress renderer) comes in through
//! `HandlerContext`; all per-user state lives in the `Session` handed in.

mod fact;
mod free_chat;
mod persona;
mod quiz;
mod recommend;
pub mod text;
mod translate;

#[cfg(test)]
mod proptests;

pub use fact::FactHandler;
pub use free_chat::FreeChatHandler;
pub use persona::PersonaHandler;
pub use quiz::QuizHandler;
pub use recommend::RecommendHandler;
pub use translate::TranslateHandler;

use crate::resources::ResourceCatalog;
use crate::runtime::traits::{CompletionClient, UpstreamError};
use crate::state_machine::state::Turn;
use crate::state_machine::{Mode, ModeInput, RenderInstruction, Renderer, Session, SessionId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

pub const APOLOGY: &str = "😔 Вибач, не вдалося отримати відповідь. Спробуй ще раз.";
pub const GENERATING_REPLY: &str = "🔄 Генерую відповідь...";

/// Result of a handler call: the final render and the state to persist
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub render: RenderInstruction,
    pub next: Mode,
}

impl Outcome {
    pub fn new(render: RenderInstruction, next: Mode) -> Self {
        Self { render, next }
    }
}

/// Recoverable failure render: nothing was mutated, the user may retry
pub fn apology() -> RenderInstruction {
    RenderInstruction::text(APOLOGY).with_finish()
}

/// All context needed for one handler invocation.
///
/// Created fresh for each dispatched event.
#[derive(Clone)]
pub struct HandlerContext {
    /// The session this call is executing within, for logs
    pub session_id: SessionId,
    pub resources: Arc<ResourceCatalog>,
    completion: Arc<dyn CompletionClient>,
    renderer: Arc<dyn Renderer>,
}

impl HandlerContext {
    pub fn new(
        session_id: SessionId,
        resources: Arc<ResourceCatalog>,
        completion: Arc<dyn CompletionClient>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            session_id,
            resources,
            completion,
            renderer,
        }
    }

    /// Emit a progress notice ahead of the final render
    pub fn notice(&self, text: impl Into<String>) {
        self.renderer.notice(RenderInstruction::text(text));
    }

    /// The mode's intro message with its image
    pub fn intro(&self, mode: Mode) -> RenderInstruction {
        let name = mode.resource_name();
        RenderInstruction::text(self.resources.load_message(name))
            .with_image(self.resources.image_path(name))
    }

    /// Run one completion, logging its outcome
    pub async fn complete(
        &self,
        mode: Mode,
        system_prompt: &str,
        user_message: &str,
        prior_turns: &[Turn],
    ) -> Result<String, UpstreamError> {
        let start = Instant::now();
        let result = self
            .completion
            .complete(system_prompt, user_message, prior_turns)
            .await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(text) => tracing::debug!(
                session_id = %self.session_id,
                %mode,
                duration_ms = %duration_ms,
                prior_turns = prior_turns.len(),
                reply_chars = text.chars().count(),
                "Completion succeeded"
            ),
            Err(e) => tracing::warn!(
                session_id = %self.session_id,
                %mode,
                duration_ms = %duration_ms,
                error = %e,
                "Completion failed"
            ),
        }
        result
    }
}

/// Behavior of one conversation mode
#[async_trait]
pub trait ModeHandler: Send + Sync {
    fn mode(&self) -> Mode;

    /// Called after the router installed a fresh context for this mode
    async fn enter(&self, session: &mut Session, ctx: &HandlerContext) -> Outcome;

    /// Mode-local input. Only reached for inputs the transition table
    /// routes to this mode.
    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        let _ = (input, ctx);
        tracing::warn!(session_id = %session.id, mode = %self.mode(), "Input not handled by mode");
        Outcome::new(RenderInstruction::text(APOLOGY).with_finish(), self.mode())
    }
}

/// The six mode handlers, looked up by mode
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn ModeHandler>>,
}

impl HandlerRegistry {
    pub fn standard() -> Self {
        Self {
            handlers: vec![
                Arc::new(FactHandler),
                Arc::new(FreeChatHandler),
                Arc::new(PersonaHandler),
                Arc::new(QuizHandler),
                Arc::new(TranslateHandler),
                Arc::new(RecommendHandler),
            ],
        }
    }

    pub fn get(&self, mode: Mode) -> Option<&Arc<dyn ModeHandler>> {
        self.handlers.iter().find(|h| h.mode() == mode)
    }
}
