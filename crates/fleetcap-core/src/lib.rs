//! fleetcap-core — capacity accounting primitives.
//!
//! Converts instance sizes into normalized capacity units and reconciles
//! running capacity against reserved capacity per instance family.
//!
//! ```text
//! normalize("37xlarge", 9)  → 2664.0
//! summarize(instances, reservations) → [FamilySummary] sorted by family
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use aggregate::summarize;
pub use config::FleetcapConfig;
pub use error::{CapacityError, CapacityResult};
pub use normalize::{normalize, size_multiplier, split_instance_type};
pub use types::*;
