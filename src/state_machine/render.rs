//! Render instructions handed to the messaging collaborator

use super::event::Event;
use serde::Serialize;
use std::path::PathBuf;

/// A selectable option: display label plus the opaque id sent back on press
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOption {
    pub label: String,
    pub id: String,
}

/// Structured output; carries no transport-specific markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderInstruction {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RenderOption>,
}

impl RenderInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            options: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: Option<PathBuf>) -> Self {
        self.image = image;
        self
    }

    pub fn with_option(mut self, label: impl Into<String>, id: impl Into<String>) -> Self {
        self.options.push(RenderOption {
            label: label.into(),
            id: id.into(),
        });
        self
    }

    pub fn with_options<L, I>(mut self, options: impl IntoIterator<Item = (L, I)>) -> Self
    where
        L: Into<String>,
        I: Into<String>,
    {
        self.options
            .extend(options.into_iter().map(|(label, id)| RenderOption {
                label: label.into(),
                id: id.into(),
            }));
        self
    }

    /// Append the "back to menu" option
    pub fn with_finish(self) -> Self {
        self.with_option("🏠 Закінчити", "finish")
    }

    #[cfg(test)]
    pub fn has_option(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id == id)
    }
}

/// Side channel for output that precedes the final render of a turn
pub trait Renderer: Send + Sync {
    /// Every dispatched event is acknowledged before any handler runs
    fn acknowledge(&self, event: &Event);

    /// Transient progress notice, e.g. while waiting on the model
    fn notice(&self, instruction: RenderInstruction);
}
