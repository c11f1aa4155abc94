//! End-to-end capacity summary for one region.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fleetcap_core::{summarize, FamilySummary};

use crate::error::{InventoryError, InventoryResult};
use crate::source::InventorySource;

/// Summary rows for a region, sorted by family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacityReport {
    pub region: String,
    pub rows: Vec<FamilySummary>,
}

/// Resolves the effective region and reconciles its inventory.
pub struct CapacityService {
    source: InventorySource,
    default_region: Option<String>,
}

impl CapacityService {
    pub fn new(source: InventorySource, default_region: Option<String>) -> Self {
        Self {
            source,
            default_region: default_region.filter(|r| !r.trim().is_empty()),
        }
    }

    pub fn default_region(&self) -> Option<&str> {
        self.default_region.as_deref()
    }

    pub fn source(&self) -> &InventorySource {
        &self.source
    }

    /// Explicit region if non-blank, else the configured default.
    pub fn resolve_region(&self, region: Option<&str>) -> InventoryResult<String> {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => Ok(region.to_string()),
            None => self
                .default_region
                .clone()
                .ok_or(InventoryError::MissingRegion),
        }
    }

    /// Load reservations and instances concurrently and aggregate them.
    pub async fn summarize(&self, region: Option<&str>) -> InventoryResult<CapacityReport> {
        let region = self.resolve_region(region)?;
        debug!(region = %region, "summarizing capacity");

        let (reservations, instances) = tokio::try_join!(
            self.source.load_reservations(&region),
            self.source.load_instances(&region),
        )?;

        let rows = summarize(&instances, &reservations);
        info!(region = %region, families = rows.len(), "capacity summary ready");

        Ok(CapacityReport { region, rows })
    }
}
