//! Assemble the capacity service from configuration.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use fleetcap_api::RequestAuthenticator;
use fleetcap_cache::SystemClock;
use fleetcap_core::FleetcapConfig;
use fleetcap_inventory::{CapacityService, InventorySource, ProviderMarkers, SnapshotInventory};

/// Load the config file (if any) and apply environment overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FleetcapConfig> {
    let config = match path {
        Some(path) => FleetcapConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FleetcapConfig::default(),
    };
    Ok(config.with_env_overrides())
}

/// Build the service with one snapshot-backed client per region.
pub fn build_service(config: &FleetcapConfig) -> anyhow::Result<CapacityService> {
    let inventory = &config.inventory;

    let regions = if inventory.regions.is_empty() {
        SnapshotInventory::discover_regions(&inventory.snapshot_dir)?
    } else {
        inventory.regions.clone()
    };
    if regions.is_empty() {
        warn!(dir = ?inventory.snapshot_dir, "no regions configured or discovered");
    }

    let mut source = InventorySource::new(Arc::new(SystemClock::new()))
        .with_markers(ProviderMarkers::from_config(inventory))
        .with_ttls(inventory.reservations_ttl()?, inventory.instances_ttl()?);

    for region in &regions {
        let client = SnapshotInventory::for_region(&inventory.snapshot_dir, region);
        info!(region = %region, path = ?client.path(), "region registered");
        source = source.with_region(region.clone(), Arc::new(client));
    }

    Ok(CapacityService::new(
        source,
        config.service.default_region.clone(),
    ))
}

pub fn authenticator(config: &FleetcapConfig) -> RequestAuthenticator {
    if config.service.verification_token.is_empty() {
        warn!("no verification token configured; every request will be rejected");
    }
    RequestAuthenticator::new(config.service.verification_token.clone())
}
