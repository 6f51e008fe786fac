//! Production order lifecycle
//!
//! ```text
//! DRAFT → IN_PROGRESS → MACERATING → QC → PACKAGING → DONE → CLOSED
//! ```
//!
//! Forward only, one stage at a time, no cancel path. A transition is built
//! on a candidate copy of the order: side effects are applied to the
//! candidate, the candidate is validated, and it is returned only when clean.
//! The caller's order is never touched, so a refused transition (or a failed
//! commit of the returned candidate) leaves nothing half-applied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ManufacturingOrder, OrderStatus};
use crate::validation::{validate_order, ValidationErrors};

/// A permitted move between two statuses
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Button label shown to the operator
    pub action: &'static str,
}

/// Stock sufficiency reported by the reservation checks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockReadiness {
    pub materials_sufficient: bool,
    pub packaging_sufficient: bool,
}

impl StockReadiness {
    pub fn is_sufficient(&self) -> bool {
        self.materials_sufficient && self.packaging_sufficient
    }
}

/// Why a transition was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order is {status} and cannot move any further")]
    Terminal { status: OrderStatus },

    #[error("Cannot move from {from} to {to}; the next stage is {expected}")]
    IllegalTarget {
        from: OrderStatus,
        to: OrderStatus,
        expected: OrderStatus,
    },

    #[error("Cannot move from {from} to {to} while the order has errors: {errors}")]
    ValidationFailed {
        from: OrderStatus,
        to: OrderStatus,
        errors: ValidationErrors,
    },

    #[error("Cannot complete production: materials or packaging are short")]
    InsufficientStock { readiness: StockReadiness },
}

/// The outgoing transition of a status, if any
pub fn transition_for(status: OrderStatus) -> Option<Transition> {
    let (to, action) = match status {
        OrderStatus::Draft => (OrderStatus::InProgress, "Start production"),
        OrderStatus::InProgress => (OrderStatus::Macerating, "Start maceration"),
        OrderStatus::Macerating => (OrderStatus::Qc, "Send to QC"),
        OrderStatus::Qc => (OrderStatus::Packaging, "Approve for packaging"),
        OrderStatus::Packaging => (OrderStatus::Done, "Complete production"),
        OrderStatus::Done => (OrderStatus::Closed, "Close order"),
        OrderStatus::Closed => return None,
    };
    Some(Transition {
        from: status,
        to,
        action,
    })
}

/// Statuses reachable in one step from `status`
pub fn allowed_targets(status: OrderStatus) -> Vec<OrderStatus> {
    transition_for(status).map(|t| t.to).into_iter().collect()
}

fn apply_side_effects(candidate: &mut ManufacturingOrder, transition: &Transition, today: NaiveDate) {
    if transition.from == OrderStatus::Draft && candidate.manufacturing_date.is_none() {
        candidate.manufacturing_date = Some(today);
    }
}

/// Move the order to `target`, returning the updated candidate.
///
/// `today` is the date stamped by side effects; `stock` gates the
/// completion step (PACKAGING → DONE).
pub fn transition(
    order: &ManufacturingOrder,
    target: OrderStatus,
    stock: StockReadiness,
    today: NaiveDate,
) -> Result<ManufacturingOrder, TransitionError> {
    let step = transition_for(order.status).ok_or(TransitionError::Terminal {
        status: order.status,
    })?;
    if step.to != target {
        return Err(TransitionError::IllegalTarget {
            from: order.status,
            to: target,
            expected: step.to,
        });
    }

    let mut candidate = order.clone();
    apply_side_effects(&mut candidate, &step, today);

    let errors = validate_order(&candidate);
    if !errors.is_empty() {
        return Err(TransitionError::ValidationFailed {
            from: step.from,
            to: step.to,
            errors,
        });
    }

    if step.to == OrderStatus::Done && !stock.is_sufficient() {
        return Err(TransitionError::InsufficientStock { readiness: stock });
    }

    candidate.status = step.to;
    Ok(candidate)
}

/// Move the order to its designated next status
pub fn advance(
    order: &ManufacturingOrder,
    stock: StockReadiness,
    today: NaiveDate,
) -> Result<ManufacturingOrder, TransitionError> {
    match order.status.next() {
        Some(next) => transition(order, next, stock, today),
        None => Err(TransitionError::Terminal {
            status: order.status,
        }),
    }
}
