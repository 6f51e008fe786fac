//! Batch yield models and calculations

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Process-loss percentages, applied multiplicatively in stage order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLoss {
    #[serde(default)]
    pub mixing_loss_pct: Decimal,
    #[serde(default)]
    pub filtration_loss_pct: Decimal,
    #[serde(default)]
    pub filling_loss_pct: Decimal,
}

/// Production stage that loses volume
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LossStage {
    Mixing,
    Filtration,
    Filling,
}

impl LossStage {
    /// Stages in physical process order
    pub const ORDERED: [LossStage; 3] = [LossStage::Mixing, LossStage::Filtration, LossStage::Filling];
}

impl ProcessLoss {
    pub fn percent_for(&self, stage: LossStage) -> Decimal {
        match stage {
            LossStage::Mixing => self.mixing_loss_pct,
            LossStage::Filtration => self.filtration_loss_pct,
            LossStage::Filling => self.filling_loss_pct,
        }
    }
}

/// Volume flowing through one loss stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageLoss {
    pub stage: LossStage,
    pub input_ml: Decimal,
    pub lost_ml: Decimal,
    pub output_ml: Decimal,
}

/// Derived yield of a batch. Only `actual_ml` and `actual_units` are operator-entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchYield {
    #[serde(default)]
    pub theoretical_ml: Decimal,
    #[serde(default)]
    pub expected_ml: Decimal,
    #[serde(default)]
    pub expected_units: u32,
    #[serde(default)]
    pub yield_percentage: Decimal,
    #[serde(default)]
    pub actual_ml: Option<Decimal>,
    #[serde(default)]
    pub actual_units: Option<u32>,
}

/// units × bottle size, or `None` when the product is not representable
pub fn checked_theoretical_volume(units_requested: u32, bottle_size_ml: Decimal) -> Option<Decimal> {
    if bottle_size_ml <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    Decimal::from(units_requested).checked_mul(bottle_size_ml)
}

/// Theoretical volume: units × bottle size (0 for a non-positive bottle size or on overflow)
pub fn theoretical_volume(units_requested: u32, bottle_size_ml: Decimal) -> Decimal {
    checked_theoretical_volume(units_requested, bottle_size_ml).unwrap_or(Decimal::ZERO)
}

/// Walk the volume through mixing, filtration and filling
pub fn stage_losses(theoretical_ml: Decimal, loss: &ProcessLoss) -> Vec<StageLoss> {
    let mut volume = theoretical_ml.max(Decimal::ZERO);
    LossStage::ORDERED
        .iter()
        .map(|&stage| {
            let pct = loss
                .percent_for(stage)
                .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            let output_ml = volume * (Decimal::ONE - pct / Decimal::ONE_HUNDRED);
            let entry = StageLoss {
                stage,
                input_ml: volume,
                lost_ml: volume - output_ml,
                output_ml,
            };
            volume = output_ml;
            entry
        })
        .collect()
}

/// Expected volume after all process losses
pub fn apply_process_loss(theoretical_ml: Decimal, loss: &ProcessLoss) -> Decimal {
    stage_losses(theoretical_ml, loss)
        .last()
        .map(|stage| stage.output_ml)
        .unwrap_or(Decimal::ZERO)
}

/// Whole deliverable bottles; a partially filled bottle does not count
pub fn expected_units(expected_ml: Decimal, bottle_size_ml: Decimal) -> u32 {
    if bottle_size_ml <= Decimal::ZERO || expected_ml <= Decimal::ZERO {
        return 0;
    }
    expected_ml
        .checked_div(bottle_size_ml)
        .map(|bottles| bottles.floor().to_u32().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Yield percentage, or `None` when it is not representable
pub fn checked_yield_percentage(actual_ml: Option<Decimal>, theoretical_ml: Decimal) -> Option<Decimal> {
    match actual_ml {
        Some(actual) if theoretical_ml > Decimal::ZERO => actual
            .checked_div(theoretical_ml)?
            .checked_mul(Decimal::ONE_HUNDRED),
        _ => Some(Decimal::ZERO),
    }
}

/// Actual over theoretical volume as a percentage, or 0 when either is missing or out of range
pub fn yield_percentage(actual_ml: Option<Decimal>, theoretical_ml: Decimal) -> Decimal {
    checked_yield_percentage(actual_ml, theoretical_ml).unwrap_or(Decimal::ZERO)
}

/// Re-derive every yield output from the order inputs
pub fn calculate_yield(
    units_requested: u32,
    bottle_size_ml: Decimal,
    loss: &ProcessLoss,
    actual_ml: Option<Decimal>,
    actual_units: Option<u32>,
) -> BatchYield {
    let theoretical_ml = theoretical_volume(units_requested, bottle_size_ml);
    let expected_ml = apply_process_loss(theoretical_ml, loss);

    BatchYield {
        theoretical_ml,
        expected_ml,
        expected_units: expected_units(expected_ml, bottle_size_ml),
        yield_percentage: yield_percentage(actual_ml, theoretical_ml),
        actual_ml,
        actual_units,
    }
}
