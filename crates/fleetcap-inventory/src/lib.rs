//! fleetcap-inventory — reservation and instance inventory per region.
//!
//! # Architecture
//!
//! ```text
//! CapacityService::summarize(region?)
//!   └── InventorySource
//!       ├── load_reservations(region) ── CapacityCache (1h) ──┐
//!       ├── load_instances(region)    ── CapacityCache (5m) ──┤
//!       │                                                     ▼
//!       └── region → Arc<dyn InventoryApi>        upstream describe calls
//! ```
//!
//! Both loads run concurrently; results are merged by
//! [`fleetcap_core::summarize`].

pub mod api;
pub mod error;
pub mod records;
pub mod service;
pub mod snapshot;
pub mod source;

pub use api::InventoryApi;
pub use error::{InventoryError, InventoryResult};
pub use records::*;
pub use service::{CapacityReport, CapacityService};
pub use snapshot::SnapshotInventory;
pub use source::{InventorySource, ProviderMarkers};
