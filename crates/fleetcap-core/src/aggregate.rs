//! Reconcile running capacity against reserved capacity.

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{Bucket, FamilySummary, Instance, Reservation};

/// Merge instances and reservations into one row per family.
///
/// Each instance lands in exactly one bucket (emr, then spot, then
/// on-demand). Rows come back sorted by family; a family seen on only one
/// side still gets a row with the other side's buckets at zero. The output
/// does not depend on input order.
pub fn summarize(instances: &[Instance], reservations: &[Reservation]) -> Vec<FamilySummary> {
    let mut families: BTreeMap<&str, FamilySummary> = BTreeMap::new();

    for instance in instances {
        let row = families
            .entry(instance.family.as_str())
            .or_insert_with(|| FamilySummary::new(&instance.family));
        match instance.bucket() {
            Bucket::Emr => row.emr += instance.units,
            Bucket::Spot => row.spot += instance.units,
            Bucket::OnDemand => row.on_demand += instance.units,
        }
    }

    for reservation in reservations {
        families
            .entry(reservation.family.as_str())
            .or_insert_with(|| FamilySummary::new(&reservation.family))
            .reserved += reservation.units;
    }

    let rows: Vec<FamilySummary> = families
        .into_values()
        .map(|mut row| {
            row.unreserved = (row.on_demand - row.reserved).max(0.0);
            row.surplus = (row.reserved - row.on_demand).max(0.0);
            row
        })
        .collect();

    debug!(
        instances = instances.len(),
        reservations = reservations.len(),
        families = rows.len(),
        "capacity summarized"
    );

    rows
}
