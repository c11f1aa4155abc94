//! Provider-native inventory records.
//!
//! Field names follow the EC2 `DescribeReservedInstances` /
//! `DescribeInstances` JSON shapes so snapshots can be captured straight
//! from the provider CLI.

use serde::{Deserialize, Serialize};

/// Filter on a record field, matched against any of `values`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Only reservations in the `active` state.
    pub fn active_reservations() -> Self {
        Self::new("state", &["active"])
    }

    /// Only instances in the `running` state.
    pub fn running_instances() -> Self {
        Self::new("instance-state-name", &["running"])
    }

    pub fn matches(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ReservedInstanceRecord {
    pub reserved_instances_id: String,
    /// Full instance type, e.g. `m9.37xlarge`.
    pub instance_type: String,
    pub instance_count: u32,
    /// `standard` or `convertible`.
    pub offering_class: String,
    /// `Region` or `Availability Zone`.
    pub scope: String,
    #[serde(default)]
    pub availability_zone: Option<String>,
    pub state: String,
}

impl ReservedInstanceRecord {
    /// Value of a filterable field.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "state" => Some(&self.state),
            "instance-type" => Some(&self.instance_type),
            "scope" => Some(&self.scope),
            "offering-class" => Some(&self.offering_class),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceRecord {
    pub instance_id: String,
    pub instance_type: String,
    /// `spot` for spot instances; absent for on-demand.
    #[serde(default)]
    pub instance_lifecycle: Option<String>,
    pub placement: Placement,
    pub state: InstanceState,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl InstanceRecord {
    /// Value of a filterable field.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "instance-state-name" => Some(&self.state.name),
            "instance-type" => Some(&self.instance_type),
            "availability-zone" => Some(&self.placement.availability_zone),
            _ => None,
        }
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    pub availability_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}
