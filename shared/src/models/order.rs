//! Manufacturing order aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    calculate_yield, BatchYield, DistributionEntry, FormulaLine, PackagingItem, ProcessLoss,
    ProductionCosts, QualityCheck,
};

/// A fragrance production order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingOrder {
    pub id: Uuid,
    /// Batch code (e.g., "MO-20240315-0007")
    pub batch_code: String,
    pub product_name: String,
    pub manufacturing_type: ManufacturingType,
    pub concentration: Concentration,
    pub bottle_size_ml: Decimal,
    pub units_requested: u32,
    #[serde(default)]
    pub formula: Vec<FormulaLine>,
    #[serde(default)]
    pub process_loss: ProcessLoss,
    #[serde(rename = "yield", default)]
    pub batch_yield: BatchYield,
    /// Contract orders only
    #[serde(default)]
    pub distribution: Vec<DistributionEntry>,
    #[serde(default)]
    pub packaging_items: Vec<PackagingItem>,
    #[serde(default)]
    pub costs: ProductionCosts,
    #[serde(default)]
    pub qc: Option<QualityCheck>,
    pub status: OrderStatus,
    pub branch_id: Uuid,
    #[serde(default)]
    pub manufacturing_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responsible_employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who the batch is produced for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManufacturingType {
    Internal,
    /// Produced for a third party; requires a per-location distribution
    Contract,
}

/// Fragrance concentration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Concentration {
    Parfum,
    EauDeParfum,
    EauDeToilette,
    EauDeCologne,
    EauFraiche,
}

impl std::fmt::Display for Concentration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Concentration::Parfum => write!(f, "Parfum"),
            Concentration::EauDeParfum => write!(f, "Eau de Parfum"),
            Concentration::EauDeToilette => write!(f, "Eau de Toilette"),
            Concentration::EauDeCologne => write!(f, "Eau de Cologne"),
            Concentration::EauFraiche => write!(f, "Eau Fraiche"),
        }
    }
}

/// Production lifecycle status, in forward order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Draft,
    InProgress,
    Macerating,
    Qc,
    Packaging,
    Done,
    Closed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Draft,
        OrderStatus::InProgress,
        OrderStatus::Macerating,
        OrderStatus::Qc,
        OrderStatus::Packaging,
        OrderStatus::Done,
        OrderStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Macerating => "MACERATING",
            OrderStatus::Qc => "QC",
            OrderStatus::Packaging => "PACKAGING",
            OrderStatus::Done => "DONE",
            OrderStatus::Closed => "CLOSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        OrderStatus::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// The single status this one may advance to
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Draft => Some(OrderStatus::InProgress),
            OrderStatus::InProgress => Some(OrderStatus::Macerating),
            OrderStatus::Macerating => Some(OrderStatus::Qc),
            OrderStatus::Qc => Some(OrderStatus::Packaging),
            OrderStatus::Packaging => Some(OrderStatus::Done),
            OrderStatus::Done => Some(OrderStatus::Closed),
            OrderStatus::Closed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ManufacturingOrder {
    /// A fresh draft with zero process loss and zero yield
    pub fn draft(
        batch_code: String,
        product_name: String,
        manufacturing_type: ManufacturingType,
        concentration: Concentration,
        bottle_size_ml: Decimal,
        units_requested: u32,
        branch_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            batch_code,
            product_name,
            manufacturing_type,
            concentration,
            bottle_size_ml,
            units_requested,
            formula: Vec::new(),
            process_loss: ProcessLoss::default(),
            batch_yield: BatchYield::default(),
            distribution: Vec::new(),
            packaging_items: Vec::new(),
            costs: ProductionCosts::default(),
            qc: None,
            status: OrderStatus::Draft,
            branch_id,
            manufacturing_date: None,
            expiry_date: None,
            due_at: None,
            responsible_employee_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Re-derive yield and cost total after any field edit.
///
/// Pure: the input is untouched and operator-entered actuals are carried over.
pub fn recompute(order: &ManufacturingOrder) -> ManufacturingOrder {
    let mut next = order.clone();
    next.batch_yield = calculate_yield(
        order.units_requested,
        order.bottle_size_ml,
        &order.process_loss,
        order.batch_yield.actual_ml,
        order.batch_yield.actual_units,
    );
    next.costs = order.costs.with_total();
    next
}

/// Generate a batch code: MO-YYYYMMDD-NNNN
pub fn generate_batch_code(date: NaiveDate, sequence: u32) -> String {
    format!("MO-{}-{:04}", date.format("%Y%m%d"), sequence)
}
