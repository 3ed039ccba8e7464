//! Protoscribe TUI - Terminal user interface
//!
//! Two screens sharing one session:
//! - Parameters: the trial form, submitted with Ctrl+G
//! - Output: the editable refined text next to the draft history

mod app;
mod clipboard;
mod events;
mod form;
mod theme;
pub mod views;

pub use app::{App, Screen};
pub use clipboard::{copy_and_wait, ClipboardError, SystemClipboard};
pub use events::AppEvent;
pub use form::{FormField, FormState};
pub use theme::Theme;
