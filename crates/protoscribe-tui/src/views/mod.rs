mod history;
mod toast;

pub use history::HistoryPanel;
pub use toast::{Toast, ToastManager, ToastVariant};
