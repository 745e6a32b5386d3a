//! Pure transition table
//!
//! Maps (current state, event) to the handler invocation it selects. The
//! router never invokes a handler for a pair that is not listed here.

use super::event::{Event, OptionId};
use super::state::Mode;
use thiserror::Error;

/// Input delivered to a handler while its mode is active
#[derive(Debug, Clone, PartialEq)]
pub enum ModeInput {
    Option(OptionId),
    Text(String),
}

/// What the router should do with an event
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Entry command: (re)initialise the session at Menu
    Start,
    /// Tear the session down
    Terminate,
    /// Switch into a mode
    Enter(Mode),
    /// Hand input to the active mode's handler
    Input(Mode, ModeInput),
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Event {event} is not accepted in state {state}")]
    IllegalTransition { state: String, event: String },
}

impl TransitionError {
    fn illegal(state: Option<Mode>, event: &Event) -> Self {
        TransitionError::IllegalTransition {
            state: state.map_or_else(|| "none".to_string(), |m| m.to_string()),
            event: event.kind(),
        }
    }
}

/// Pure transition function.
///
/// `state` is `None` when the user has no live session (never started, or
/// cancelled); only the entry command and cancel are accepted then.
pub fn transition(state: Option<Mode>, event: Event) -> Result<Route, TransitionError> {
    match (state, event) {
        // ============================================================
        // Global events
        // ============================================================
        (_, Event::Cancel) => Ok(Route::Terminate),
        (_, Event::EnterMode(Mode::Menu)) => Ok(Route::Start),
        (Some(_), Event::EnterMode(mode)) => Ok(Route::Enter(mode)),

        // ============================================================
        // Mode-local events
        // ============================================================
        (Some(Mode::FreeChat), Event::TextInput(text)) => {
            Ok(Route::Input(Mode::FreeChat, ModeInput::Text(text)))
        }
        (Some(Mode::FreeChat), Event::SelectOption(option @ OptionId::AskMore)) => {
            Ok(Route::Input(Mode::FreeChat, ModeInput::Option(option)))
        }

        (Some(Mode::Persona), Event::TextInput(text)) => {
            Ok(Route::Input(Mode::Persona, ModeInput::Text(text)))
        }
        (Some(Mode::Persona), Event::SelectOption(option @ OptionId::Persona(_))) => {
            Ok(Route::Input(Mode::Persona, ModeInput::Option(option)))
        }

        (Some(Mode::Quiz), Event::TextInput(text)) => {
            Ok(Route::Input(Mode::Quiz, ModeInput::Text(text)))
        }
        (
            Some(Mode::Quiz),
            Event::SelectOption(
                option @ (OptionId::QuizTopic(_)
                | OptionId::QuizNext
                | OptionId::QuizRestart
                | OptionId::QuizChangeTopic),
            ),
        ) => Ok(Route::Input(Mode::Quiz, ModeInput::Option(option))),

        (Some(Mode::Translate), Event::TextInput(text)) => {
            Ok(Route::Input(Mode::Translate, ModeInput::Text(text)))
        }
        (Some(Mode::Translate), Event::SelectOption(option @ OptionId::Language(_))) => {
            Ok(Route::Input(Mode::Translate, ModeInput::Option(option)))
        }

        (
            Some(Mode::Recommend),
            Event::SelectOption(
                option @ (OptionId::Category(_) | OptionId::Genre(_) | OptionId::Dislike),
            ),
        ) => Ok(Route::Input(Mode::Recommend, ModeInput::Option(option))),

        // ============================================================
        // Everything else is rejected
        // ============================================================
        (state, event) => Err(TransitionError::illegal(state, &event)),
    }
}

/// The only state a route may leave the session in.
///
/// `None` means the session no longer exists. Fact is single-shot and lands
/// back on Menu; every other mode loops on itself until a global event.
pub fn declared_next(route: &Route) -> Option<Mode> {
    match route {
        Route::Terminate => None,
        Route::Start | Route::Enter(Mode::Fact | Mode::Menu) => Some(Mode::Menu),
        Route::Enter(mode) | Route::Input(mode, _) => Some(*mode),
    }
}
