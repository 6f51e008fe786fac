//! Production planning: one pass of every engine component over an order

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::lifecycle::{self, StockReadiness, TransitionError};
use crate::models::{
    check_distribution, check_material_reservation, cost_per_unit, plan_packaging, recompute,
    scale_formula, stage_losses, DistributionCheck, ManufacturingOrder, MaterialCatalog,
    MaterialReservation, OrderStatus, PackagingPlan, ScaledFormulaLine, StageLoss, StockLedger,
};
use crate::validation::{validate_order, ValidationErrors};

/// Recomputed order with every derived annotation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlan {
    pub order: ManufacturingOrder,
    /// Formula scaled to the theoretical volume
    pub scaled_formula: Vec<ScaledFormulaLine>,
    pub stage_losses: Vec<StageLoss>,
    pub distribution: DistributionCheck,
    pub materials: MaterialReservation,
    pub packaging: PackagingPlan,
    pub cost_per_unit: Decimal,
    pub errors: ValidationErrors,
    pub next_status: Option<OrderStatus>,
}

impl ProductionPlan {
    /// True when the order may be saved or advanced
    pub fn is_committable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn readiness(&self) -> StockReadiness {
        StockReadiness {
            materials_sufficient: self.materials.all_sufficient,
            packaging_sufficient: self.packaging.all_sufficient,
        }
    }

    /// Advance the planned order one stage
    pub fn advance(&self, today: NaiveDate) -> Result<ManufacturingOrder, TransitionError> {
        lifecycle::advance(&self.order, self.readiness(), today)
    }
}

/// Recompute an order and annotate it against a catalog and stock snapshot
pub fn plan_production(
    order: &ManufacturingOrder,
    catalog: &dyn MaterialCatalog,
    stock: &dyn StockLedger,
) -> ProductionPlan {
    let order = recompute(order);
    let theoretical_ml = order.batch_yield.theoretical_ml;

    let scaled_formula = scale_formula(&order.formula, theoretical_ml, catalog);
    let materials = check_material_reservation(&scaled_formula, order.branch_id, stock);
    let packaging = plan_packaging(
        &order.packaging_items,
        order.units_requested,
        order.branch_id,
        stock,
    );

    ProductionPlan {
        stage_losses: stage_losses(theoretical_ml, &order.process_loss),
        distribution: check_distribution(
            order.manufacturing_type,
            &order.distribution,
            order.units_requested,
        ),
        cost_per_unit: cost_per_unit(&order.costs, order.batch_yield.expected_units),
        errors: validate_order(&order),
        next_status: order.status.next(),
        scaled_formula,
        materials,
        packaging,
        order,
    }
}
