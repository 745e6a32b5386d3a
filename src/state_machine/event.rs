//! Inbound events

use super::state::Mode;
use crate::catalog::{self, Category, Language, Persona, QuizTopic};
use std::fmt;

/// Events that drive the conversation state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A mode selector, or the entry command when the mode is `Menu`
    EnterMode(Mode),
    /// A mode-local button press
    SelectOption(OptionId),
    /// Free text typed by the user
    TextInput(String),
    /// Terminate the session
    Cancel,
}

impl Event {
    /// Interpret an opaque button payload
    pub fn from_button(payload: &str) -> Self {
        match Mode::from_selector(payload) {
            Some(mode) => Event::EnterMode(mode),
            None => Event::SelectOption(OptionId::parse(payload)),
        }
    }

    /// Short description for logs; never includes user text
    pub fn kind(&self) -> String {
        match self {
            Event::EnterMode(mode) => format!("enter_mode:{mode}"),
            Event::SelectOption(option) => format!("select_option:{option}"),
            Event::TextInput(_) => "text_input".to_string(),
            Event::Cancel => "cancel".to_string(),
        }
    }
}

/// Mode-local option identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum OptionId {
    Persona(&'static Persona),
    QuizTopic(&'static QuizTopic),
    QuizNext,
    QuizRestart,
    QuizChangeTopic,
    Language(&'static Language),
    Category(Category),
    /// Genre ids only resolve against the selected category
    Genre(String),
    Dislike,
    AskMore,
    Unknown(String),
}

impl OptionId {
    pub fn parse(payload: &str) -> Self {
        match payload {
            "quiz_next" => return OptionId::QuizNext,
            "quiz_restart" => return OptionId::QuizRestart,
            "quiz_change" => return OptionId::QuizChangeTopic,
            "rec_dislike" => return OptionId::Dislike,
            "gpt_ask_more" => return OptionId::AskMore,
            _ => {}
        }
        if let Some(persona) = catalog::persona(payload) {
            OptionId::Persona(persona)
        } else if let Some(topic) = catalog::quiz_topic(payload) {
            OptionId::QuizTopic(topic)
        } else if let Some(language) = catalog::language(payload) {
            OptionId::Language(language)
        } else if let Some(category) = Category::from_id(payload) {
            OptionId::Category(category)
        } else if payload.starts_with("genre_") {
            OptionId::Genre(payload.to_string())
        } else {
            OptionId::Unknown(payload.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OptionId::Persona(p) => p.id,
            OptionId::QuizTopic(t) => t.id,
            OptionId::QuizNext => "quiz_next",
            OptionId::QuizRestart => "quiz_restart",
            OptionId::QuizChangeTopic => "quiz_change",
            OptionId::Language(l) => l.id,
            OptionId::Category(c) => c.id(),
            OptionId::Genre(id) | OptionId::Unknown(id) => id,
            OptionId::Dislike => "rec_dislike",
            OptionId::AskMore => "gpt_ask_more",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
