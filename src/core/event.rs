//! Event types.
//!
//! Events represent input from the external world (keyboard, timers,
//! terminal state changes). They flow INTO the application from the TUI
//! layer.

use crossterm::event::KeyEvent;

/// Events from the terminal/environment.
///
/// These are produced by the TUI event loop and consumed by the app.
#[derive(Clone, Debug)]
pub enum Event {
    /// Terminal initialized
    Init,
    /// Quit requested
    Quit,
    /// Error occurred in the event loop
    Error(String),
    /// Periodic tick (for animations)
    Tick,
    /// Render frame requested
    Render,
    /// Text pasted from clipboard
    Paste(String),
    /// Key pressed
    Key(KeyEvent),
    /// Terminal resized
    Resize(u16, u16),
}
