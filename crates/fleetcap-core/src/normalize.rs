//! Size normalization.
//!
//! Every instance size maps to a multiplier of the `small` baseline:
//!
//! | size | multiplier |
//! |---|---|
//! | nano | 0.25 |
//! | micro | 0.5 |
//! | small | 1 |
//! | medium | 2 |
//! | large | 4 |
//! | xlarge | 8 |
//! | `<n>xlarge` | n × 8 |
//!
//! All multipliers are multiples of 0.25, so sums of normalized units are
//! exact in `f64` and independent of summation order.

use crate::error::{CapacityError, CapacityResult};

/// Multiplier for a single `xlarge` instance; `<n>xlarge` scales linearly.
const XLARGE_UNITS: f64 = 8.0;

/// Named sizes and their normalization factors.
const NAMED_SIZES: &[(&str, f64)] = &[
    ("nano", 0.25),
    ("micro", 0.5),
    ("small", 1.0),
    ("medium", 2.0),
    ("large", 4.0),
    ("xlarge", XLARGE_UNITS),
];

/// Return the normalization factor for one instance of `size`.
pub fn size_multiplier(size: &str) -> CapacityResult<f64> {
    if let Some((_, factor)) = NAMED_SIZES.iter().find(|(name, _)| *name == size) {
        return Ok(*factor);
    }

    let digits = size
        .strip_suffix("xlarge")
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| CapacityError::InvalidSizeDescriptor(size.to_string()))?;

    let n: u32 = digits
        .parse()
        .map_err(|_| CapacityError::InvalidSizeDescriptor(size.to_string()))?;

    Ok(f64::from(n) * XLARGE_UNITS)
}

/// Normalized capacity of `count` instances of `size`.
pub fn normalize(size: &str, count: u32) -> CapacityResult<f64> {
    Ok(f64::from(count) * size_multiplier(size)?)
}

/// Split an instance type such as `"m9.37xlarge"` into `("m9", "37xlarge")`.
///
/// Only the first `.` separates family from size.
pub fn split_instance_type(instance_type: &str) -> CapacityResult<(&str, &str)> {
    match instance_type.split_once('.') {
        Some((family, size)) if !family.is_empty() && !size.is_empty() => Ok((family, size)),
        _ => Err(CapacityError::InvalidInstanceType(
            instance_type.to_string(),
        )),
    }
}
