//! Widget trait for full-screen data views.
//!
//! Widgets follow the Elm architecture with a single-funnel update pattern:
//! - `init()` queues initial message(s)
//! - `handle_input()` queues messages from user input
//! - `handle_tick()` handles animation ticks
//! - `update()` processes all queued messages - THE SINGLE FUNNEL
//!
//! Only `update()` can return commands, close the widget, or report errors.
//! This keeps every side effect flowing through one place, and it means the
//! app only renders between fully processed mutation batches, never in the
//! middle of one.

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::core::command::Command;
use crate::core::event::Event;

/// Result from `update()`
pub enum UpdateResult {
    /// No action needed
    Idle,
    /// Spawn these commands
    Commands(Vec<Box<dyn Command>>),
    /// Close this widget (go back to the selector)
    Close,
    /// Report an error; prior state stays on screen
    Error(String),
}

impl<T: Command> From<T> for UpdateResult {
    fn from(value: T) -> Self {
        Self::Commands(vec![Box::new(value)])
    }
}

/// A key hint shown in the status bar.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

/// A full-screen data widget.
///
/// Widgets manage their own internal state and message queue. The App calls
/// methods in this order:
///
/// 1. `init()` - once when the widget becomes active
/// 2. `update()` - immediately after init to process the startup message
/// 3. For each event:
///    - `handle_tick()` if tick event
///    - `handle_input()` if input event, then `update()` if consumed
/// 4. When a command completes: `update()`
/// 5. The widget is dropped when it closes; any in-flight command's
///    completion message lands on a closed channel and is unobservable.
pub trait Widget {
    /// Initialize the widget by queuing startup message(s).
    ///
    /// Called once when the widget becomes active. The App will call
    /// `update()` immediately after to process it.
    fn init(&mut self) {}

    /// Handle a tick event for animations (spinners, etc.).
    ///
    /// Visual updates only; do not queue messages here.
    fn handle_tick(&mut self) {}

    /// Handle an input event (keyboard, paste).
    ///
    /// Queue internal messages based on user input. Return `true` if the
    /// event was consumed (the App will then call `update()`).
    fn handle_input(&mut self, event: &Event) -> bool;

    /// Process all queued messages and return the result.
    ///
    /// **THIS IS THE SINGLE FUNNEL.** This is the ONLY method that can
    /// return commands to spawn, request to close the widget, or report
    /// errors.
    ///
    /// # Errors
    /// Returns an error for defects (e.g. a fetch plan writing an
    /// undeclared attribute). The App displays it loudly.
    fn update(&mut self) -> color_eyre::Result<UpdateResult>;

    /// Render the current state to the terminal.
    ///
    /// Must be a pure function of current widget state: no mutation, no
    /// fetch, no messages.
    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments for the navigation bar.
    fn breadcrumbs(&self) -> Vec<String>;

    /// Key hints for the status bar.
    fn key_hints(&self) -> Vec<KeyHint> {
        vec![]
    }
}
