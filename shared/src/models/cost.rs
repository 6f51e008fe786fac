//! Production cost aggregation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cost entries of an order; `total` is derived
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCosts {
    #[serde(default)]
    pub labor: Decimal,
    #[serde(default)]
    pub overhead: Decimal,
    #[serde(default)]
    pub other: Decimal,
    #[serde(default)]
    pub total: Decimal,
}

impl ProductionCosts {
    /// Copy with `total` re-derived from the entries
    pub fn with_total(&self) -> Self {
        Self {
            total: aggregate_costs(self),
            ..self.clone()
        }
    }
}

/// labor + overhead + other, or `None` when the sum is not representable
pub fn checked_aggregate_costs(costs: &ProductionCosts) -> Option<Decimal> {
    costs.labor.checked_add(costs.overhead)?.checked_add(costs.other)
}

/// labor + overhead + other (0 when the sum overflows)
pub fn aggregate_costs(costs: &ProductionCosts) -> Decimal {
    checked_aggregate_costs(costs).unwrap_or(Decimal::ZERO)
}

/// Total cost spread over the deliverable units, or 0 when there are none
pub fn cost_per_unit(costs: &ProductionCosts, expected_units: u32) -> Decimal {
    if expected_units == 0 {
        Decimal::ZERO
    } else {
        aggregate_costs(costs) / Decimal::from(expected_units)
    }
}
