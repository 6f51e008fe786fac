//! Catalog, inventory and employee records read by the production engine
//!
//! The engine never owns these records. It reads them through the
//! [`MaterialCatalog`] and [`StockLedger`] seams, which callers back with
//! whatever store they have; [`ProductCatalog`] and [`InventorySnapshot`]
//! are the in-memory implementations built from the inbound arrays.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product (raw material, packaging component or finished good)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Reference density in g/ml, when known
    #[serde(default)]
    pub density: Option<Decimal>,
}

/// On-hand quantity of a product at a branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: Decimal,
}

/// Employee entry for the responsible-employee selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeData {
    pub id: Uuid,
    pub name: String,
}

/// Read-only material lookup
pub trait MaterialCatalog {
    fn lookup_material(&self, id: Uuid) -> Option<&Product>;
}

/// Read-only stock lookup keyed by (product, branch)
pub trait StockLedger {
    fn lookup_stock(&self, product_id: Uuid, branch_id: Uuid) -> Option<Decimal>;
}

/// In-memory product catalog
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<Uuid, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl MaterialCatalog for ProductCatalog {
    fn lookup_material(&self, id: Uuid) -> Option<&Product> {
        self.products.get(&id)
    }
}

/// Point-in-time inventory snapshot.
///
/// Rows sharing the same (product, branch) key are summed.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    quantities: HashMap<(Uuid, Uuid), Decimal>,
}

impl InventorySnapshot {
    pub fn new(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut quantities: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
        for item in items {
            let quantity = quantities
                .entry((item.product_id, item.branch_id))
                .or_insert(Decimal::ZERO);
            *quantity = quantity.checked_add(item.quantity).unwrap_or(Decimal::MAX);
        }
        Self { quantities }
    }
}

impl StockLedger for InventorySnapshot {
    fn lookup_stock(&self, product_id: Uuid, branch_id: Uuid) -> Option<Decimal> {
        self.quantities.get(&(product_id, branch_id)).copied()
    }
}
