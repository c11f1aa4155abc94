//! Cached, normalized inventory loads per region.
//!
//! `InventorySource` owns one upstream client per region and two caches:
//! reservations (1 hour) and running instances (5 minutes). Every record
//! is converted into the canonical [`Reservation`] / [`Instance`] shape;
//! a single malformed record fails the whole load so bad data is never
//! aggregated as zero.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use fleetcap_cache::{CapacityCache, Clock};
use fleetcap_core::config::InventoryConfig;
use fleetcap_core::{
    normalize, split_instance_type, Instance, OfferingClass, Reservation, ANY_ZONE,
};

use crate::api::InventoryApi;
use crate::error::{InventoryError, InventoryResult};
use crate::records::{Filter, InstanceRecord, ReservedInstanceRecord};

pub const RESERVATIONS_TTL: Duration = Duration::from_secs(60 * 60);
pub const INSTANCES_TTL: Duration = Duration::from_secs(5 * 60);

/// Provider-specific values used when classifying records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMarkers {
    /// Tag key present on managed map-reduce cluster members.
    pub special_workload_tag: String,
    /// `InstanceLifecycle` value for spot instances.
    pub spot_lifecycle: String,
    /// `Scope` value for region-wide reservations.
    pub region_scope: String,
}

impl Default for ProviderMarkers {
    fn default() -> Self {
        Self::from_config(&InventoryConfig::default())
    }
}

impl ProviderMarkers {
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self {
            special_workload_tag: config.special_workload_tag.clone(),
            spot_lifecycle: config.spot_lifecycle.clone(),
            region_scope: config.region_scope.clone(),
        }
    }

    /// Convert an upstream reservation into a [`Reservation`].
    pub fn reservation(&self, record: &ReservedInstanceRecord) -> InventoryResult<Reservation> {
        let (family, size) = split_instance_type(&record.instance_type)?;
        let offering_class = parse_offering_class(&record.offering_class)?;
        let units = normalize(size, record.instance_count)?;

        let region_wide = offering_class == OfferingClass::Convertible
            || record.scope.eq_ignore_ascii_case(&self.region_scope);
        let az = if region_wide {
            ANY_ZONE.to_string()
        } else {
            record.availability_zone.clone().ok_or_else(|| {
                InventoryError::MalformedRecord(format!(
                    "zonal reservation {} has no availability zone",
                    record.reserved_instances_id
                ))
            })?
        };

        Ok(Reservation {
            id: record.reserved_instances_id.clone(),
            family: family.to_string(),
            size: size.to_string(),
            offering_class,
            units,
            az,
        })
    }

    /// Convert an upstream instance into an [`Instance`].
    pub fn instance(&self, record: &InstanceRecord) -> InventoryResult<Instance> {
        let (family, size) = split_instance_type(&record.instance_type)?;
        Ok(Instance {
            family: family.to_string(),
            size: size.to_string(),
            units: normalize(size, 1)?,
            spot: record.instance_lifecycle.as_deref() == Some(self.spot_lifecycle.as_str()),
            emr: record.has_tag(&self.special_workload_tag),
            az: record.placement.availability_zone.clone(),
        })
    }
}

fn parse_offering_class(class: &str) -> InventoryResult<OfferingClass> {
    if class.eq_ignore_ascii_case("standard") {
        Ok(OfferingClass::Standard)
    } else if class.eq_ignore_ascii_case("convertible") {
        Ok(OfferingClass::Convertible)
    } else {
        Err(InventoryError::MalformedRecord(format!(
            "unknown offering class: {class}"
        )))
    }
}

/// Region-keyed inventory with independent reservation/instance caches.
pub struct InventorySource {
    clients: HashMap<String, Arc<dyn InventoryApi>>,
    markers: Arc<ProviderMarkers>,
    clock: Arc<dyn Clock>,
    reservations: CapacityCache<String, Arc<Vec<Reservation>>, InventoryError>,
    instances: CapacityCache<String, Arc<Vec<Instance>>, InventoryError>,
}

impl InventorySource {
    /// Create a source with default TTLs and markers and no regions.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: HashMap::new(),
            markers: Arc::new(ProviderMarkers::default()),
            reservations: CapacityCache::new("reservations", RESERVATIONS_TTL, clock.clone()),
            instances: CapacityCache::new("instances", INSTANCES_TTL, clock.clone()),
            clock,
        }
    }

    /// Register the upstream client serving `region`.
    pub fn with_region(mut self, region: impl Into<String>, client: Arc<dyn InventoryApi>) -> Self {
        self.clients.insert(region.into(), client);
        self
    }

    pub fn with_markers(mut self, markers: ProviderMarkers) -> Self {
        self.markers = Arc::new(markers);
        self
    }

    /// Replace both caches with ones using the given TTLs.
    pub fn with_ttls(mut self, reservations_ttl: Duration, instances_ttl: Duration) -> Self {
        self.reservations =
            CapacityCache::new("reservations", reservations_ttl, self.clock.clone());
        self.instances = CapacityCache::new("instances", instances_ttl, self.clock.clone());
        self
    }

    /// Regions with a registered client, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self.clients.keys().cloned().collect();
        regions.sort();
        regions
    }

    fn client(&self, region: &str) -> InventoryResult<Arc<dyn InventoryApi>> {
        self.clients
            .get(region)
            .cloned()
            .ok_or_else(|| InventoryError::UnknownRegion(region.to_string()))
    }

    /// Active reservations in `region`, cached for the reservations TTL.
    pub async fn load_reservations(&self, region: &str) -> InventoryResult<Arc<Vec<Reservation>>> {
        let client = self.client(region)?;
        let markers = self.markers.clone();
        let region_name = region.to_string();

        self.reservations
            .get(region.to_string(), move || {
                fetch_reservations(client, markers, region_name)
            })
            .await
    }

    /// Running instances in `region`, cached for the instances TTL.
    pub async fn load_instances(&self, region: &str) -> InventoryResult<Arc<Vec<Instance>>> {
        let client = self.client(region)?;
        let markers = self.markers.clone();
        let region_name = region.to_string();

        self.instances
            .get(region.to_string(), move || {
                fetch_instances(client, markers, region_name)
            })
            .await
    }
}

async fn fetch_reservations(
    client: Arc<dyn InventoryApi>,
    markers: Arc<ProviderMarkers>,
    region: String,
) -> InventoryResult<Arc<Vec<Reservation>>> {
    let records = client
        .describe_reserved_instances(&[Filter::active_reservations()])
        .await?;
    let reservations = records
        .iter()
        .map(|record| markers.reservation(record))
        .collect::<InventoryResult<Vec<_>>>()?;

    info!(
        region = %region,
        count = reservations.len(),
        units = reservations.iter().map(|r| r.units).sum::<f64>(),
        "reservations loaded"
    );
    Ok(Arc::new(reservations))
}

async fn fetch_instances(
    client: Arc<dyn InventoryApi>,
    markers: Arc<ProviderMarkers>,
    region: String,
) -> InventoryResult<Arc<Vec<Instance>>> {
    let records = client
        .describe_instances(&[Filter::running_instances()])
        .await?;
    let instances = records
        .iter()
        .map(|record| markers.instance(record))
        .collect::<InventoryResult<Vec<_>>>()?;

    info!(
        region = %region,
        count = instances.len(),
        units = instances.iter().map(|i| i.units).sum::<f64>(),
        "instances loaded"
    );
    Ok(Arc::new(instances))
}
