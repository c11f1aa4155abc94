//! File-backed inventory.
//!
//! Serves one region from a JSON snapshot in the shape the provider CLI
//! emits:
//!
//! ```json
//! {
//!   "ReservedInstances": [ { "ReservedInstancesId": "...", ... } ],
//!   "Reservations": [ { "Instances": [ { "InstanceId": "...", ... } ] } ]
//! }
//! ```
//!
//! (`Reservations` here is the provider's launch-group wrapper around
//! running instances, not capacity reservations.) The file is re-read on
//! every call so an updated snapshot is picked up once the cache expires.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::InventoryApi;
use crate::error::{InventoryError, InventoryResult};
use crate::records::{Filter, InstanceRecord, ReservedInstanceRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventorySnapshot {
    #[serde(default)]
    pub reserved_instances: Vec<ReservedInstanceRecord>,
    #[serde(default)]
    pub reservations: Vec<LaunchGroup>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchGroup {
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
}

/// [`InventoryApi`] reading `<dir>/<region>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotInventory {
    path: PathBuf,
}

impl SnapshotInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_region(dir: &Path, region: &str) -> Self {
        Self::new(dir.join(format!("{region}.json")))
    }

    /// Regions with a snapshot file in `dir`, sorted.
    pub fn discover_regions(dir: &Path) -> InventoryResult<Vec<String>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| InventoryError::Upstream(format!("{}: {e}", dir.display())))?;

        let mut regions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        regions.sort();
        Ok(regions)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> InventoryResult<InventorySnapshot> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| InventoryError::Upstream(format!("{}: {e}", self.path.display())))?;
        let snapshot: InventorySnapshot = serde_json::from_str(&content)
            .map_err(|e| InventoryError::Upstream(format!("{}: {e}", self.path.display())))?;
        debug!(
            path = ?self.path,
            reserved_instances = snapshot.reserved_instances.len(),
            launch_groups = snapshot.reservations.len(),
            "inventory snapshot read"
        );
        Ok(snapshot)
    }
}

/// Keep records for which every filter matches its field.
fn apply_filters<T>(
    records: Vec<T>,
    filters: &[Filter],
    field: impl Fn(&T, &str) -> Option<String>,
) -> InventoryResult<Vec<T>> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        let mut keep = true;
        for filter in filters {
            let value = field(&record, &filter.name).ok_or_else(|| {
                InventoryError::Upstream(format!("unsupported filter: {}", filter.name))
            })?;
            if !filter.matches(&value) {
                keep = false;
                break;
            }
        }
        if keep {
            kept.push(record);
        }
    }
    Ok(kept)
}

#[async_trait]
impl InventoryApi for SnapshotInventory {
    async fn describe_reserved_instances(
        &self,
        filters: &[Filter],
    ) -> InventoryResult<Vec<ReservedInstanceRecord>> {
        let snapshot = self.read().await?;
        apply_filters(snapshot.reserved_instances, filters, |r, name| {
            r.field(name).map(str::to_string)
        })
    }

    async fn describe_instances(&self, filters: &[Filter]) -> InventoryResult<Vec<InstanceRecord>> {
        let snapshot = self.read().await?;
        let instances: Vec<InstanceRecord> = snapshot
            .reservations
            .into_iter()
            .flat_map(|group| group.instances)
            .collect();
        apply_filters(instances, filters, |r, name| r.field(name).map(str::to_string))
    }
}
