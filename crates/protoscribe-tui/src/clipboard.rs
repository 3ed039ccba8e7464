//! System clipboard access
//!
//! On X11 and Wayland the copied text is served by whichever process owns the
//! selection, so the `arboard::Clipboard` handle must outlive the copy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("nothing to copy")]
    Empty,

    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),
}

/// Clipboard handle opened on first use and kept for the owner's lifetime
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handle has been opened
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Put `text` on the clipboard; the selection stays served while `self` lives
    pub fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        ensure_not_blank(text)?;

        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard.set_text(text.to_string())?;
        tracing::debug!(chars = text.chars().count(), "copied output to clipboard");
        Ok(())
    }
}

/// Copy `text` from a process that exits right afterwards
///
/// On Linux this blocks until another program takes over the selection.
pub fn copy_and_wait(text: &str) -> Result<(), ClipboardError> {
    ensure_not_blank(text)?;

    let mut clipboard = arboard::Clipboard::new()?;
    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;
        clipboard.set().wait().text(text.to_string())?;
    }
    #[cfg(not(target_os = "linux"))]
    clipboard.set_text(text.to_string())?;

    tracing::debug!(chars = text.chars().count(), "clipboard handed over");
    Ok(())
}

fn ensure_not_blank(text: &str) -> Result<(), ClipboardError> {
    if text.trim().is_empty() {
        Err(ClipboardError::Empty)
    } else {
        Ok(())
    }
}
