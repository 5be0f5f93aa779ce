//! Core framework for skylens.
//!
//! This module contains the foundational types and traits that power the TUI:
//! - [`Event`] - Input events from the terminal
//! - [`AppMessage`] - Internal communication within the app
//! - [`Command`] - Async side effect operations
//! - [`Widget`] - Full-screen data widgets (Elm-style architecture)

pub mod command;
pub mod event;
pub mod message;
pub mod widget;

// Re-export commonly used types
pub use command::{Command, CommandEnv};
pub use event::Event;
pub use message::AppMessage;
pub use widget::{KeyHint, UpdateResult, Widget};
