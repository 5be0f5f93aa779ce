//! Async command pattern for side effects.
//!
//! Commands represent async operations that run outside the main event
//! loop. Widgets return commands from `update()`, and the App spawns them
//! with automatic completion detection.

mod clipboard;
mod env;

use async_trait::async_trait;
pub use clipboard::CopyToClipboardCmd;
pub use env::CommandEnv;

/// Async command that performs side effects.
///
/// Commands are spawned by the App. They typically send results back to
/// the widget via a channel; a widget that has since closed simply never
/// observes the message.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging and error display.
    fn name(&self) -> String;

    /// Execute the command.
    ///
    /// # Errors
    /// Only for defects; expected failures (e.g. an unreachable endpoint)
    /// are data and travel back through the widget's channel instead.
    async fn execute(self: Box<Self>) -> color_eyre::Result<()>;
}
