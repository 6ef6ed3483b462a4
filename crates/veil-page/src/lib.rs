//! Host page boundary for veil
//!
//! This crate contains:
//! - The `Page` trait (selector queries, ancestry, structural state)
//! - The `EditableSurface` trait plus flat and block implementations
//! - `PageEvent`, the abstract mutation/interaction event source
//! - The `Fragment` markup tree used by the copy interceptor
//! - An in-memory page for tests and host-less embedding
//!
//! Selector strings are opaque to the core; each page implementation
//! decides what they mean (CSS selectors in a browser host, marker labels
//! in the in-memory page).

pub mod blocks;
pub mod events;
pub mod flat;
pub mod fragment;
pub mod memory;
pub mod page;
pub mod surface;

pub use blocks::BlockSurface;
pub use events::PageEvent;
pub use flat::FlatSurface;
pub use fragment::{Fragment, FragmentError};
pub use memory::MemoryPage;
pub use page::{NodeId, Page, Scope};
pub use surface::EditableSurface;
