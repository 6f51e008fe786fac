//! Advisory stock checks for formula materials and packaging.
//!
//! Both checks read a stock snapshot and never reserve or lock anything:
//! two orders planned from the same snapshot can both report sufficiency
//! for the same scarce material.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MaterialKind, ScaledFormulaLine, StockLedger};

/// Sufficiency of one formula material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequirement {
    pub material_id: Uuid,
    pub material_name: String,
    pub kind: MaterialKind,
    pub required_ml: Decimal,
    pub required_g: Decimal,
    pub available: Decimal,
    pub shortfall: Decimal,
    pub is_sufficient: bool,
}

/// Sufficiency of every formula material at a branch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReservation {
    pub lines: Vec<MaterialRequirement>,
    pub all_sufficient: bool,
}

impl MaterialReservation {
    pub fn shortages(&self) -> impl Iterator<Item = &MaterialRequirement> {
        self.lines.iter().filter(|line| !line.is_sufficient)
    }
}

/// Packaging component attached to each finished unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagingItem {
    pub product_id: Uuid,
    pub name: String,
    pub qty_per_unit: Decimal,
}

/// Sufficiency of one packaging component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRequirement {
    pub product_id: Uuid,
    pub name: String,
    pub qty_per_unit: Decimal,
    pub required: Decimal,
    pub available: Decimal,
    pub shortfall: Decimal,
    pub is_sufficient: bool,
}

/// Packaging requirements for the whole order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagingPlan {
    pub items: Vec<PackagingRequirement>,
    pub all_sufficient: bool,
}

fn available_stock(stock: &dyn StockLedger, product_id: Uuid, branch_id: Uuid) -> Decimal {
    stock
        .lookup_stock(product_id, branch_id)
        .unwrap_or(Decimal::ZERO)
}

fn shortfall(required: Decimal, available: Decimal) -> Decimal {
    required
        .checked_sub(available)
        .unwrap_or(Decimal::MAX)
        .max(Decimal::ZERO)
}

/// Compare scaled formula masses against on-hand stock at a branch
pub fn check_material_reservation(
    scaled_formula: &[ScaledFormulaLine],
    branch_id: Uuid,
    stock: &dyn StockLedger,
) -> MaterialReservation {
    let lines: Vec<MaterialRequirement> = scaled_formula
        .iter()
        .map(|line| {
            let available = available_stock(stock, line.material_id, branch_id);
            MaterialRequirement {
                material_id: line.material_id,
                material_name: line.material_name.clone(),
                kind: line.kind,
                required_ml: line.required_ml,
                required_g: line.required_g,
                available,
                shortfall: shortfall(line.required_g, available),
                is_sufficient: available >= line.required_g,
            }
        })
        .collect();

    MaterialReservation {
        all_sufficient: lines.iter().all(|line| line.is_sufficient),
        lines,
    }
}

/// Scale per-unit packaging by the requested units and compare against stock
pub fn plan_packaging(
    packaging_items: &[PackagingItem],
    units_requested: u32,
    branch_id: Uuid,
    stock: &dyn StockLedger,
) -> PackagingPlan {
    let units = Decimal::from(units_requested);
    let items: Vec<PackagingRequirement> = packaging_items
        .iter()
        .map(|item| {
            let required = item.qty_per_unit.checked_mul(units).unwrap_or(Decimal::MAX);
            let available = available_stock(stock, item.product_id, branch_id);
            PackagingRequirement {
                product_id: item.product_id,
                name: item.name.clone(),
                qty_per_unit: item.qty_per_unit,
                required,
                available,
                shortfall: shortfall(required, available),
                is_sufficient: available >= required,
            }
        })
        .collect();

    PackagingPlan {
        all_sufficient: items.iter().all(|item| item.is_sufficient),
        items,
    }
}
