//! Domain types for capacity accounting.
//!
//! All capacity figures are in normalized units (see [`crate::normalize`]).

use serde::{Deserialize, Serialize};

/// Zone marker for reservations usable in any zone of the region.
pub const ANY_ZONE: &str = "*";

// ── Running capacity ───────────────────────────────────────────────

/// A running compute instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Instance family, e.g. `m9`.
    pub family: String,
    /// Size suffix, e.g. `37xlarge`.
    pub size: String,
    pub units: f64,
    /// Running on the spot market.
    pub spot: bool,
    /// Member of a managed map-reduce cluster.
    pub emr: bool,
    pub az: String,
}

impl Instance {
    /// The single bucket this instance's units are counted in.
    pub fn bucket(&self) -> Bucket {
        if self.emr {
            Bucket::Emr
        } else if self.spot {
            Bucket::Spot
        } else {
            Bucket::OnDemand
        }
    }
}

/// Aggregation bucket for running capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    OnDemand,
    Spot,
    Emr,
}

// ── Reserved capacity ──────────────────────────────────────────────

/// Reservation offering class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferingClass {
    Standard,
    Convertible,
}

/// An active capacity reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub family: String,
    pub size: String,
    pub offering_class: OfferingClass,
    /// `instance_count × size multiplier`.
    pub units: f64,
    /// [`ANY_ZONE`] for region-scoped or convertible reservations.
    pub az: String,
}

// ── Aggregation output ─────────────────────────────────────────────

/// Reconciled capacity for one instance family.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilySummary {
    pub family: String,
    pub on_demand: f64,
    pub spot: f64,
    pub emr: f64,
    pub reserved: f64,
    /// On-demand units not covered by reservations.
    pub unreserved: f64,
    /// Reserved units not used by on-demand capacity.
    pub surplus: f64,
}

impl FamilySummary {
    /// Empty accumulator for `family`.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(spot: bool, emr: bool) -> Instance {
        Instance {
            family: "m9".to_string(),
            size: "large".to_string(),
            units: 4.0,
            spot,
            emr,
            az: "us-east-1a".to_string(),
        }
    }

    #[test]
    fn bucket_priority() {
        assert_eq!(instance(false, false).bucket(), Bucket::OnDemand);
        assert_eq!(instance(true, false).bucket(), Bucket::Spot);
        assert_eq!(instance(false, true).bucket(), Bucket::Emr);
        assert_eq!(instance(true, true).bucket(), Bucket::Emr);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let json = serde_json::to_value(FamilySummary::new("c6")).unwrap();
        assert_eq!(json["family"], "c6");
        assert_eq!(json["onDemand"], 0.0);
        assert!(json.get("on_demand").is_none());
    }

    #[test]
    fn offering_class_wire_names() {
        let class: OfferingClass = serde_json::from_str("\"convertible\"").unwrap();
        assert_eq!(class, OfferingClass::Convertible);
        assert_eq!(
            serde_json::to_string(&OfferingClass::Standard).unwrap(),
            "\"standard\""
        );
    }
}
