//! Application-level messages.
//!
//! Messages drive state transitions on the main loop. Widget-specific
//! messages are handled locally within each widget using their own message
//! channels (e.g. `NasaMsg`); only app-wide concerns appear here.

use crate::ui::ToastType;

/// Application-level messages for state transitions and global state.
#[derive(Debug, Clone)]
pub enum AppMessage {
    // === Lifecycle ===
    /// Suspend the application (Ctrl+Z)
    Suspend,
    /// Resume from suspension
    Resume,
    /// Quit the application
    Quit,
    /// Clear and redraw the screen
    ClearScreen,

    // === Feedback ===
    /// Display an error in the status bar
    DisplayError(String),
    /// Show a toast notification
    ShowToast { message: String, toast_type: ToastType },

    // === Widgets ===
    /// A spawned command finished; the active widget should process
    /// pending messages
    CommandCompleted { name: String, success: bool },
    /// User selected a widget from the selector
    SelectWidget(String),
    /// Return to the widget selector
    GoBack,
}
