//! Conversation router
//!
//! Drives one session through the transition table: acknowledge the event,
//! resolve the route, run the handler, persist the next state.

use super::traits::CompletionClient;
use crate::handlers::{HandlerContext, HandlerRegistry, Outcome};
use crate::resources::ResourceCatalog;
use crate::state_machine::{
    declared_next, transition, Event, Mode, RenderInstruction, Renderer, Route, Session,
    SessionId,
};
use std::sync::Arc;
use std::time::Instant;

pub const SESSION_ENDED: &str = "🚪 Розмову завершено. /start для початку";
pub const START_FIRST: &str = "Використай /start, щоб почати";
pub const USE_BUTTONS: &str = "Скористайся кнопками нижче 👇 або /start, щоб почати спочатку";

pub struct ConversationRouter {
    resources: Arc<ResourceCatalog>,
    completion: Arc<dyn CompletionClient>,
    handlers: HandlerRegistry,
}

impl ConversationRouter {
    pub fn new(resources: Arc<ResourceCatalog>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            resources,
            completion,
            handlers: HandlerRegistry::standard(),
        }
    }

    /// Handle one event for one session.
    ///
    /// `slot` is the session owned by the caller; `None` means no live
    /// session. Callers must serialise dispatches for the same slot.
    pub async fn dispatch(
        &self,
        slot: &mut Option<Session>,
        session_id: &SessionId,
        event: Event,
        renderer: Arc<dyn Renderer>,
    ) -> RenderInstruction {
        renderer.acknowledge(&event);

        let start = Instant::now();
        let from = slot.as_ref().map(|s| s.state);
        let kind = event.kind();

        let route = match transition(from, event) {
            Ok(route) => route,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Rejected event");
                return Self::reminder(from);
            }
        };

        let declared = declared_next(&route);
        let render = match route {
            Route::Terminate => {
                *slot = None;
                RenderInstruction::text(SESSION_ENDED)
            }
            Route::Start => {
                let session = slot.get_or_insert_with(|| Session::new(session_id.clone()));
                session.reset_to_menu();
                session.touch();
                self.main_menu()
            }
            Route::Enter(mode) => {
                match (slot.as_mut(), self.handlers.get(mode)) {
                    (Some(session), Some(handler)) => {
                        session.enter_mode(mode);
                        session.state = mode;
                        let ctx = self.context(session_id, renderer);
                        let outcome = handler.enter(session, &ctx).await;
                        Self::settle(session, declared, outcome)
                    }
                    _ => self.unroutable(session_id, from, &kind),
                }
            }
            Route::Input(mode, input) => {
                match (slot.as_mut(), self.handlers.get(mode)) {
                    (Some(session), Some(handler)) => {
                        let ctx = self.context(session_id, renderer);
                        let outcome = handler.handle_input(session, input, &ctx).await;
                        Self::settle(session, declared, outcome)
                    }
                    _ => self.unroutable(session_id, from, &kind),
                }
            }
        };

        tracing::info!(
            session_id = %session_id,
            event = %kind,
            from = %from.map_or_else(|| "none".to_string(), |m| m.to_string()),
            to = %slot.as_ref().map_or_else(|| "none".to_string(), |s| s.state.to_string()),
            duration_ms = %start.elapsed().as_millis(),
            "Event dispatched"
        );
        render
    }

    /// Persist the handler's next state, refusing anything the table did not
    /// declare for this route
    fn settle(session: &mut Session, declared: Option<Mode>, outcome: Outcome) -> RenderInstruction {
        let next = match declared {
            Some(declared) if declared != outcome.next => {
                tracing::error!(
                    session_id = %session.id,
                    declared = %declared,
                    returned = %outcome.next,
                    "Handler returned undeclared next state"
                );
                declared
            }
            Some(declared) => declared,
            None => outcome.next,
        };
        session.state = next;
        session.touch();
        outcome.render
    }

    fn context(&self, session_id: &SessionId, renderer: Arc<dyn Renderer>) -> HandlerContext {
        HandlerContext::new(
            session_id.clone(),
            self.resources.clone(),
            self.completion.clone(),
            renderer,
        )
    }

    /// Greeting plus one button per mode
    pub fn main_menu(&self) -> RenderInstruction {
        let name = Mode::Menu.resource_name();
        RenderInstruction::text(self.resources.load_message(name))
            .with_image(self.resources.image_path(name))
            .with_options(
                Mode::ALL
                    .into_iter()
                    .filter(|m| *m != Mode::Menu)
                    .map(|m| (m.menu_label(), m.selector())),
            )
    }

    fn reminder(state: Option<Mode>) -> RenderInstruction {
        match state {
            None => RenderInstruction::text(START_FIRST),
            Some(_) => RenderInstruction::text(USE_BUTTONS).with_finish(),
        }
    }

    fn unroutable(&self, session_id: &SessionId, from: Option<Mode>, kind: &str) -> RenderInstruction {
        tracing::error!(session_id = %session_id, event = %kind, "No handler for routed event");
        match from {
            Some(_) => self.main_menu(),
            None => RenderInstruction::text(START_FIRST),
        }
    }
}
