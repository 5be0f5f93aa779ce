//! Reusable UI building blocks.
//!
//! These widgets know nothing about the fetch lifecycle or any endpoint;
//! they handle input events and draw themselves.

mod select_list;
mod spinner;
mod status_bar;
mod toast;

pub use select_list::{ListEvent, SelectList};
pub use spinner::Spinner;
pub use status_bar::StatusBar;
pub use toast::{Toast, ToastManager, ToastType};
