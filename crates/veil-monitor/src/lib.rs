//! Surface discovery for veil
//!
//! The `DiscoveryMonitor` watches a page for editable surfaces matching a
//! configured description, attaches a `SurfaceBinder` to each qualifying
//! one, routes input/paste events to the bound binder, and tears the
//! binder down again on save, cancel, or removal. Per surface the
//! lifecycle is `unbound -> bound -> unbound`, re-entered freely for new
//! edit sessions.

pub mod monitor;

pub use monitor::{DiscoveryMonitor, EventDisposition, MonitorConfig};
