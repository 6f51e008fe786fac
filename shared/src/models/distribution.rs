//! Contract-manufacturing unit distribution

use serde::{Deserialize, Serialize};

use super::ManufacturingType;

/// Units delivered to one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub location_name: String,
    pub units: u32,
}

/// Outcome of checking a distribution against the requested units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionCheck {
    pub total_distributed: u64,
    pub units_requested: u32,
    /// Units still to allocate; negative when over-allocated
    pub remaining: i64,
    pub is_valid: bool,
}

/// Total units across all locations
pub fn total_distributed(distribution: &[DistributionEntry]) -> u64 {
    distribution.iter().map(|entry| u64::from(entry.units)).sum()
}

/// Check that a contract distribution accounts for exactly the requested units.
///
/// Internal orders have no distribution requirement and always pass.
pub fn check_distribution(
    manufacturing_type: ManufacturingType,
    distribution: &[DistributionEntry],
    units_requested: u32,
) -> DistributionCheck {
    let total = total_distributed(distribution);
    let remaining = i64::from(units_requested) - total as i64;

    DistributionCheck {
        total_distributed: total,
        units_requested,
        remaining,
        is_valid: match manufacturing_type {
            ManufacturingType::Internal => true,
            ManufacturingType::Contract => remaining == 0,
        },
    }
}
