//! System clipboard access for copying the displayed value.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// A handle to the system clipboard, opened on first use and then kept.
///
/// On X11 and Wayland the copied text is served by the process that owns
/// the handle, so it must outlive the copy.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Places `text` on the system clipboard.
    ///
    /// Fails on headless systems or when no clipboard provider is running.
    /// A failed open is retried on the next copy.
    pub fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.handle.is_none() {
            self.handle = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = &mut self.handle {
            clipboard.set_text(text.to_owned())?;
        }
        tracing::debug!(len = text.len(), "copied display to clipboard");
        Ok(())
    }
}

impl fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.is_open())
            .finish()
    }
}
