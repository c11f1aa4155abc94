//! fleetcap.toml configuration parser.
//!
//! Every field has a default, so an empty file is a valid config. The
//! default region and verification token can be overridden from the
//! environment (`FLEETCAP_DEFAULT_REGION`, `FLEETCAP_VERIFICATION_TOKEN`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CapacityError, CapacityResult};

pub const ENV_DEFAULT_REGION: &str = "FLEETCAP_DEFAULT_REGION";
pub const ENV_VERIFICATION_TOKEN: &str = "FLEETCAP_VERIFICATION_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FleetcapConfig {
    pub service: ServiceConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Region used when a request names none.
    pub default_region: Option<String>,
    /// Shared secret callers must present.
    pub verification_token: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_region: None,
            verification_token: String::new(),
            port: 8080,
        }
    }
}

/// Upstream inventory settings and provider-specific markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InventoryConfig {
    /// Directory holding `<region>.json` inventory snapshots.
    pub snapshot_dir: PathBuf,
    /// Regions served; empty means every snapshot found in `snapshot_dir`.
    pub regions: Vec<String>,
    pub reservations_ttl: String,
    pub instances_ttl: String,
    /// Tag key marking managed map-reduce cluster members.
    pub special_workload_tag: String,
    /// Lifecycle value marking spot instances.
    pub spot_lifecycle: String,
    /// Scope value marking region-wide reservations.
    pub region_scope: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("/var/lib/fleetcap/snapshots"),
            regions: Vec::new(),
            reservations_ttl: "1h".to_string(),
            instances_ttl: "5m".to_string(),
            special_workload_tag: "aws:elasticmapreduce:job-flow-id".to_string(),
            spot_lifecycle: "spot".to_string(),
            region_scope: "Region".to_string(),
        }
    }
}

impl InventoryConfig {
    pub fn reservations_ttl(&self) -> CapacityResult<Duration> {
        parse_duration(&self.reservations_ttl)
    }

    pub fn instances_ttl(&self) -> CapacityResult<Duration> {
        parse_duration(&self.instances_ttl)
    }
}

impl FleetcapConfig {
    pub fn from_file(path: &Path) -> CapacityResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CapacityError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CapacityResult<Self> {
        let config: FleetcapConfig =
            toml::from_str(content).map_err(|e| CapacityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FLEETCAP_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(region) = lookup(ENV_DEFAULT_REGION).filter(|r| !r.trim().is_empty()) {
            self.service.default_region = Some(region.trim().to_string());
        }
        if let Some(token) = lookup(ENV_VERIFICATION_TOKEN) {
            self.service.verification_token = token;
        }
        self
    }

    fn validate(&self) -> CapacityResult<()> {
        self.inventory.reservations_ttl()?;
        self.inventory.instances_ttl()?;
        Ok(())
    }
}

/// Parse a duration like `"30s"`, `"5m"`, `"1h"`, or bare seconds.
pub fn parse_duration(s: &str) -> CapacityResult<Duration> {
    let s = s.trim();
    let (digits, scale) = if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else {
        (s, 1)
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .map(Duration::from_secs)
        .ok_or_else(|| CapacityError::Config(format!("invalid duration: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FleetcapConfig::from_toml_str("").unwrap();
        assert_eq!(config, FleetcapConfig::default());
        assert_eq!(
            config.inventory.reservations_ttl().unwrap(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.inventory.instances_ttl().unwrap(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[service]
default_region = "eu-west-1"
verification_token = "s3cret"
port = 9000

[inventory]
snapshot_dir = "/tmp/snapshots"
regions = ["eu-west-1", "us-east-1"]
instances_ttl = "90s"
special_workload_tag = "cluster-id"
"#;
        let config = FleetcapConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.service.default_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.service.port, 9000);
        assert_eq!(config.inventory.regions.len(), 2);
        assert_eq!(
            config.inventory.instances_ttl().unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(config.inventory.special_workload_tag, "cluster-id");
        assert_eq!(config.inventory.spot_lifecycle, "spot");
    }

    #[test]
    fn rejects_bad_duration() {
        let err = FleetcapConfig::from_toml_str("[inventory]\ninstances_ttl = \"soon\"\n")
            .unwrap_err();
        assert!(matches!(err, CapacityError::Config(_)));
    }

    #[test]
    fn env_overrides_region_and_token() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DEFAULT_REGION, " ap-south-2 "),
            (ENV_VERIFICATION_TOKEN, "from-env"),
        ]);
        let config = FleetcapConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.service.default_region.as_deref(), Some("ap-south-2"));
        assert_eq!(config.service.verification_token, "from-env");
    }

    #[test]
    fn blank_env_region_is_ignored() {
        let mut config = FleetcapConfig::default();
        config.service.default_region = Some("us-east-1".to_string());
        let config = config.with_overrides(|key| {
            (key == ENV_DEFAULT_REGION).then(|| "  ".to_string())
        });
        assert_eq!(config.service.default_region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration(&format!("{}h", u64::MAX / 3600 + 1)).is_err());
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
        assert_eq!(
            parse_duration(&format!("{}s", u64::MAX)).unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }
}
