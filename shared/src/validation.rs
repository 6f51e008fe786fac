//! Validation for manufacturing orders
//!
//! Violations are data, not faults: [`validate_order`] collects them into a
//! [`ValidationErrors`] map keyed by field name, and an order may be committed
//! or advanced only while that map is empty.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    check_distribution, checked_aggregate_costs, checked_theoretical_volume,
    checked_yield_percentage, formula_percentage_total, FormulaLine, LossStage,
    ManufacturingOrder, ProcessLoss,
};

/// Allowed drift of the formula total away from 100%
pub const FORMULA_TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

// ============================================================================
// Error map
// ============================================================================

/// Field name → human-readable message
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn record(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.insert(field, message);
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", joined.join("; "))
    }
}

// ============================================================================
// Field validations
// ============================================================================

/// Validate that the formula percentages sum to 100 within tolerance
pub fn validate_formula_total(formula: &[FormulaLine]) -> Result<(), String> {
    if formula.is_empty() {
        return Err("Formula must contain at least one ingredient".to_string());
    }
    let total = formula_percentage_total(formula);
    if (total - Decimal::ONE_HUNDRED).abs() > FORMULA_TOTAL_TOLERANCE {
        return Err(format!(
            "Formula percentages must sum to 100% (currently {}%)",
            total.normalize()
        ));
    }
    Ok(())
}

/// Validate each formula line's percentage and explicit density
pub fn validate_formula_lines(formula: &[FormulaLine]) -> Result<(), String> {
    for line in formula {
        if line.percentage < Decimal::ZERO || line.percentage > Decimal::ONE_HUNDRED {
            return Err(format!(
                "{}: percentage must be between 0 and 100",
                line.material_name
            ));
        }
        if matches!(line.density, Some(density) if density <= Decimal::ZERO) {
            return Err(format!("{}: density must be positive", line.material_name));
        }
    }
    Ok(())
}

/// Validate that every process loss lies in [0, 100)
pub fn validate_process_loss(loss: &ProcessLoss) -> Result<(), &'static str> {
    let in_range = LossStage::ORDERED.iter().all(|&stage| {
        let pct = loss.percent_for(stage);
        pct >= Decimal::ZERO && pct < Decimal::ONE_HUNDRED
    });
    if !in_range {
        return Err("Process loss percentages must be at least 0 and below 100");
    }
    Ok(())
}

/// Validate the contract distribution against the requested units
pub fn validate_distribution(order: &ManufacturingOrder) -> Result<(), String> {
    let check = check_distribution(
        order.manufacturing_type,
        &order.distribution,
        order.units_requested,
    );
    if check.is_valid {
        Ok(())
    } else {
        Err(format!(
            "Distributed units ({}) must equal units requested ({})",
            check.total_distributed, check.units_requested
        ))
    }
}

/// Validate that the expiry date does not precede the manufacturing date
pub fn validate_expiry_date(order: &ManufacturingOrder) -> Result<(), &'static str> {
    match (order.manufacturing_date, order.expiry_date) {
        (Some(made), Some(expires)) if expires < made => {
            Err("Expiry date cannot be before the manufacturing date")
        }
        _ => Ok(()),
    }
}

/// Validate that units × bottle size is representable
pub fn validate_batch_volume(order: &ManufacturingOrder) -> Result<(), &'static str> {
    match checked_theoretical_volume(order.units_requested, order.bottle_size_ml) {
        Some(_) => Ok(()),
        None => Err("Batch volume (units × bottle size) is too large"),
    }
}

/// Validate that the recorded actual volume yields a representable percentage
pub fn validate_actual_volume(order: &ManufacturingOrder) -> Result<(), &'static str> {
    let theoretical = checked_theoretical_volume(order.units_requested, order.bottle_size_ml)
        .unwrap_or(Decimal::ZERO);
    match checked_yield_percentage(order.batch_yield.actual_ml, theoretical) {
        Some(_) => Ok(()),
        None => Err("Actual volume is out of range for this batch"),
    }
}

// ============================================================================
// Order validation
// ============================================================================

/// Run every order check and collect the failures by field
pub fn validate_order(order: &ManufacturingOrder) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if order.product_name.trim().is_empty() {
        errors.insert("productName", "Product name is required");
    }
    if order.units_requested == 0 {
        errors.insert("unitsRequested", "Units requested must be greater than 0");
    }
    if order.bottle_size_ml <= Decimal::ZERO {
        errors.insert("bottleSizeMl", "Bottle size must be greater than 0");
    }
    errors.record(
        "bottleSizeMl",
        validate_batch_volume(order).map_err(str::to_string),
    );
    if order.manufacturing_date.is_none() {
        errors.insert("manufacturingDate", "Manufacturing date is required");
    }

    errors.record("formula", validate_formula_total(&order.formula));
    errors.record("formulaLines", validate_formula_lines(&order.formula));
    errors.record(
        "processLoss",
        validate_process_loss(&order.process_loss).map_err(str::to_string),
    );
    errors.record("distribution", validate_distribution(order));
    errors.record(
        "expiryDate",
        validate_expiry_date(order).map_err(str::to_string),
    );
    if let Err(message) = validate_actual_volume(order) {
        errors.insert("yield", message);
    }
    if checked_aggregate_costs(&order.costs).is_none() {
        errors.insert("costs", "Cost total is too large");
    }

    errors
}
