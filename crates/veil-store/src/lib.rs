//! Rule persistence for veil
//!
//! This crate provides:
//! - The `RuleStore` trait (CRUD, feature toggles, change notifications)
//! - A SQLite-backed store
//! - An in-memory store for tests and embedders
//!
//! Every mutation publishes the full new rule list on a watch channel so
//! live binders can re-snapshot on the next keystroke.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::RuleStore;
