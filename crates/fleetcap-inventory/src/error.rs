//! Inventory error types.

use fleetcap_core::CapacityError;
use thiserror::Error;

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors from resolving a region or loading its inventory.
///
/// `Clone` so a single failed load can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("upstream load failed: {0}")]
    Upstream(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("no region given and no default region configured")]
    MissingRegion,
}

impl InventoryError {
    /// True when the caller asked for something unusable, as opposed to
    /// the upstream or its data failing.
    pub fn is_region_error(&self) -> bool {
        matches!(self, Self::UnknownRegion(_) | Self::MissingRegion)
    }
}
