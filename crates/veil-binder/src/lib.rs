//! Live surface binding for veil
//!
//! One `SurfaceBinder` keeps one editable surface synchronized with the
//! rewrite engine: every user edit and paste is redacted in place, the
//! caret is repositioned, and the binder's own synthetic change
//! notification is absorbed by a single-slot echo guard so it never
//! re-enters the engine.

pub mod binder;
pub mod guard;

pub use binder::{PasteAction, SurfaceBinder};
pub use guard::EchoGuard;
