//! Persistence seam for manufacturing orders and their reference data
//!
//! The production engine owns no database connection. The service layer
//! talks to whatever implements [`OrderStore`] and [`CatalogSource`]:
//! [`crate::services::PgStore`] in the server, [`InMemoryStore`] in tests
//! and local runs.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{EmployeeData, InventoryItem, ManufacturingOrder, OrderStatus, Pagination, Product};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Storage of the order documents
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn fetch_order(&self, id: Uuid) -> AppResult<Option<ManufacturingOrder>>;

    /// Page of orders, newest first, plus the total count
    async fn list_orders(&self, pagination: &Pagination) -> AppResult<(Vec<ManufacturingOrder>, u64)>;

    /// Commit an order. Only a successful return makes the new state authoritative.
    async fn save_order(&self, order: &ManufacturingOrder) -> AppResult<()>;

    /// Overwrite a stored order only while it still has `expected_status`.
    ///
    /// Fails with [`AppError::Conflict`] when the stored status moved on.
    async fn replace_order(
        &self,
        order: &ManufacturingOrder,
        expected_status: OrderStatus,
    ) -> AppResult<()>;

    /// Next batch code sequence number for a production day, starting at 1
    async fn next_batch_sequence(&self, day: NaiveDate) -> AppResult<u32>;
}

/// Read-only reference data consulted while planning
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn list_inventory(&self, branch_id: Uuid) -> AppResult<Vec<InventoryItem>>;

    async fn list_employees(&self) -> AppResult<Vec<EmployeeData>>;
}

#[derive(Default)]
struct MemoryState {
    orders: HashMap<Uuid, ManufacturingOrder>,
    products: Vec<Product>,
    inventory: Vec<InventoryItem>,
    employees: Vec<EmployeeData>,
    sequences: HashMap<NaiveDate, u32>,
}

/// Process-local store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_data(
        products: Vec<Product>,
        inventory: Vec<InventoryItem>,
        employees: Vec<EmployeeData>,
    ) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.write() {
            state.products = products;
            state.inventory = inventory;
            state.employees = employees;
        }
        store
    }

    /// Make every subsequent save fail, as a lost connection would
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn fetch_order(&self, id: Uuid) -> AppResult<Option<ManufacturingOrder>> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    async fn list_orders(&self, pagination: &Pagination) -> AppResult<(Vec<ManufacturingOrder>, u64)> {
        let state = self.read()?;
        let mut orders: Vec<ManufacturingOrder> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = orders.len() as u64;
        let page = orders
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn save_order(&self, order: &ManufacturingOrder) -> AppResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Store("save rejected".to_string()));
        }
        self.write()?.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn replace_order(
        &self,
        order: &ManufacturingOrder,
        expected_status: OrderStatus,
    ) -> AppResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Store("save rejected".to_string()));
        }
        let mut state = self.write()?;
        match state.orders.get(&order.id).map(|stored| stored.status) {
            Some(status) if status == expected_status => {
                state.orders.insert(order.id, order.clone());
                Ok(())
            }
            Some(status) => Err(AppError::Conflict(format!(
                "order is {} but {} was expected",
                status, expected_status
            ))),
            None => Err(AppError::NotFound("Manufacturing order".to_string())),
        }
    }

    async fn next_batch_sequence(&self, day: NaiveDate) -> AppResult<u32> {
        let mut state = self.write()?;
        let sequence = state.sequences.entry(day).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }
}

#[async_trait]
impl CatalogSource for InMemoryStore {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.read()?.products.clone())
    }

    async fn list_inventory(&self, branch_id: Uuid) -> AppResult<Vec<InventoryItem>> {
        Ok(self
            .read()?
            .inventory
            .iter()
            .filter(|item| item.branch_id == branch_id)
            .cloned()
            .collect())
    }

    async fn list_employees(&self) -> AppResult<Vec<EmployeeData>> {
        Ok(self.read()?.employees.clone())
    }
}
