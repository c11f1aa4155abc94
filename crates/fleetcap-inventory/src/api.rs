//! Upstream inventory API seam.

use async_trait::async_trait;

use crate::error::InventoryResult;
use crate::records::{Filter, InstanceRecord, ReservedInstanceRecord};

/// One region's upstream inventory endpoint.
///
/// Implementations return records matching every filter; a failed call
/// is reported as [`crate::InventoryError::Upstream`].
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn describe_reserved_instances(
        &self,
        filters: &[Filter],
    ) -> InventoryResult<Vec<ReservedInstanceRecord>>;

    async fn describe_instances(&self, filters: &[Filter]) -> InventoryResult<Vec<InstanceRecord>>;
}
