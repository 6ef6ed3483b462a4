//! System clipboard sink

use thiserror::Error;

use crate::interceptor::ClipboardPayload;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    Backend(#[from] arboard::Error),
}

/// Writes intercepted payloads to (and reads pastes from) the system
/// clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }

    /// Write a payload; the HTML half carries the plain text as its
    /// alternate representation.
    pub fn write(&mut self, payload: &ClipboardPayload) -> Result<(), ClipboardError> {
        match &payload.html {
            Some(html) => self.inner.set_html(html, Some(&payload.text))?,
            None => self.inner.set_text(&payload.text)?,
        }
        Ok(())
    }

    pub fn read_text(&mut self) -> Result<String, ClipboardError> {
        Ok(self.inner.get_text()?)
    }
}
