//! Conversation state machine
//!
//! Session model, inbound events, render instructions and the pure
//! transition table. Everything here is free of I/O; the router in
//! `runtime` drives it.

pub mod event;
mod render;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use event::{Event, OptionId};
pub use render::{RenderInstruction, RenderOption, Renderer};
pub use state::{Mode, ModeContext, Session, SessionId};
pub use transition::{declared_next, transition, ModeInput, Route, TransitionError};
