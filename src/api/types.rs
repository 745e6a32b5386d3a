//! API request and response types

use crate::state_machine::state::RecentOutputs;
use crate::state_machine::{Event, Mode, ModeContext, Session, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One inbound interaction from the messaging collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// `/start` or `/cancel`
    Command { command: String },
    /// Opaque button payload
    Button { payload: String },
    /// Free text typed by the user
    Text { text: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InboundError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Button payload is empty")]
    EmptyPayload,
    #[error("Text is empty")]
    EmptyText,
}

impl InboundEvent {
    pub fn into_event(self) -> Result<Event, InboundError> {
        match self {
            InboundEvent::Command { command } => {
                match command.trim().trim_start_matches('/') {
                    "start" => Ok(Event::EnterMode(Mode::Menu)),
                    "cancel" => Ok(Event::Cancel),
                    _ => Err(InboundError::UnknownCommand(command)),
                }
            }
            InboundEvent::Button { payload } => {
                let payload = payload.trim();
                if payload.is_empty() {
                    Err(InboundError::EmptyPayload)
                } else {
                    Ok(Event::from_button(payload))
                }
            }
            InboundEvent::Text { text } => {
                if text.trim().is_empty() {
                    Err(InboundError::EmptyText)
                } else {
                    Ok(Event::TextInput(text))
                }
            }
        }
    }
}

/// Inspection view of a live session
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub state: Mode,
    pub mode_context: ModeContext,
    /// Turns held per mode, only for modes with any
    pub memory: BTreeMap<String, usize>,
    pub recent: RecentOutputs,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl From<Session> for SessionSnapshot {
    fn from(session: Session) -> Self {
        let memory = Mode::ALL
            .into_iter()
            .map(|mode| (mode.to_string(), session.memory.len(mode)))
            .filter(|(_, turns)| *turns > 0)
            .collect();
        Self {
            id: session.id,
            state: session.state,
            mode_context: session.mode_context,
            memory,
            recent: session.recent,
            created_at: session.created_at,
            last_active_at: session.last_active_at,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::OptionId;

    fn parse(json: &str) -> Result<Event, InboundError> {
        serde_json::from_str::<InboundEvent>(json).unwrap().into_event()
    }

    #[test]
    fn test_commands() {
        assert_eq!(
            parse(r#"{"type":"command","command":"/start"}"#),
            Ok(Event::EnterMode(Mode::Menu))
        );
        assert_eq!(parse(r#"{"type":"command","command":"cancel"}"#), Ok(Event::Cancel));
        assert_eq!(
            parse(r#"{"type":"command","command":"/help"}"#),
            Err(InboundError::UnknownCommand("/help".into()))
        );
    }

    #[test]
    fn test_buttons_and_text() {
        assert_eq!(
            parse(r#"{"type":"button","payload":"quiz_next"}"#),
            Ok(Event::SelectOption(OptionId::QuizNext))
        );
        assert_eq!(
            parse(r#"{"type":"button","payload":"gpt"}"#),
            Ok(Event::EnterMode(Mode::FreeChat))
        );
        assert_eq!(
            parse(r#"{"type":"text","text":"Привіт"}"#),
            Ok(Event::TextInput("Привіт".into()))
        );
        assert_eq!(parse(r#"{"type":"text","text":"  "}"#), Err(InboundError::EmptyText));
        assert_eq!(parse(r#"{"type":"button","payload":""}"#), Err(InboundError::EmptyPayload));
    }

    #[test]
    fn test_snapshot_counts_memory() {
        let mut session = Session::new(SessionId::new("s"));
        session.memory.record_exchange(Mode::FreeChat, "q", "a");
        let snapshot = SessionSnapshot::from(session);
        assert_eq!(snapshot.memory.get("free_chat"), Some(&2));
        assert_eq!(snapshot.memory.len(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "menu");
        assert_eq!(json["mode_context"]["mode"], "empty");
    }
}
