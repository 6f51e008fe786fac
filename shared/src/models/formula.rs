//! Fragrance formula models and scaling

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MaterialCatalog;

/// Kind of ingredient in a formula line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialKind {
    AromaOil,
    Ethanol,
    DiWater,
    Fixative,
    Color,
    Additive,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::AromaOil => write!(f, "Aroma Oil"),
            MaterialKind::Ethanol => write!(f, "Ethanol"),
            MaterialKind::DiWater => write!(f, "DI Water"),
            MaterialKind::Fixative => write!(f, "Fixative"),
            MaterialKind::Color => write!(f, "Color"),
            MaterialKind::Additive => write!(f, "Additive"),
        }
    }
}

/// One ingredient's percentage contribution to a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormulaLine {
    pub material_id: Uuid,
    pub material_name: String,
    pub kind: MaterialKind,
    /// Share of the batch volume (0-100)
    pub percentage: Decimal,
    /// g/ml; falls back to the material's reference density when absent
    #[serde(default)]
    pub density: Option<Decimal>,
}

/// A formula line annotated with absolute quantities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScaledFormulaLine {
    pub material_id: Uuid,
    pub material_name: String,
    pub kind: MaterialKind,
    pub percentage: Decimal,
    /// Density actually used for the mass conversion
    pub density: Decimal,
    pub required_ml: Decimal,
    pub required_g: Decimal,
}

/// Sum of the line percentages, saturating at `Decimal::MAX`
pub fn formula_percentage_total(formula: &[FormulaLine]) -> Decimal {
    formula.iter().fold(Decimal::ZERO, |total, line| {
        total.checked_add(line.percentage).unwrap_or(Decimal::MAX)
    })
}

fn known_density(density: Option<Decimal>) -> Option<Decimal> {
    density.filter(|d| *d > Decimal::ZERO)
}

/// Resolve the density for a line: explicit value, then catalog reference, then 1.
///
/// A density that is not positive counts as unknown.
pub fn resolve_density(line: &FormulaLine, catalog: &dyn MaterialCatalog) -> Decimal {
    known_density(line.density)
        .or_else(|| {
            catalog
                .lookup_material(line.material_id)
                .and_then(|material| known_density(material.density))
        })
        .unwrap_or(Decimal::ONE)
}

/// Scale percentage lines into absolute volume and mass for a batch.
///
/// Does not check that the percentages sum to 100; the output only means
/// something for a formula that passed validation. Amounts too large to
/// represent saturate at `Decimal::MAX`, so they never read as covered by stock.
pub fn scale_formula(
    formula: &[FormulaLine],
    total_volume_ml: Decimal,
    catalog: &dyn MaterialCatalog,
) -> Vec<ScaledFormulaLine> {
    let total_volume_ml = total_volume_ml.max(Decimal::ZERO);

    formula
        .iter()
        .map(|line| {
            let density = resolve_density(line, catalog);
            let required_ml = (line.percentage / Decimal::ONE_HUNDRED)
                .checked_mul(total_volume_ml)
                .unwrap_or(Decimal::MAX);
            ScaledFormulaLine {
                material_id: line.material_id,
                material_name: line.material_name.clone(),
                kind: line.kind,
                percentage: line.percentage,
                density,
                required_ml,
                required_g: required_ml.checked_mul(density).unwrap_or(Decimal::MAX),
            }
        })
        .collect()
}
