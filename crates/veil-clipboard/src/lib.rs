//! Copy interception for veil
//!
//! On a copy inside scope, the current selection is restored (placeholder
//! back to original) and the clipboard payload replaced — plain text
//! always, HTML additionally when the selection carries a markup fragment.
//! A failure to build the HTML half never blocks the plain-text override.

pub mod interceptor;
pub mod sink;

pub use interceptor::{ClipboardPayload, CopyInterceptor, Selection};
pub use sink::{ClipboardError, SystemClipboard};
