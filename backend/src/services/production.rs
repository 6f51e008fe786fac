//! Production service: orders through the engine and into the store

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    generate_batch_code, plan_production, Concentration, DistributionEntry, EmployeeData,
    FormulaLine, InventorySnapshot, ManufacturingOrder, ManufacturingType, OrderStatus,
    PackagingItem, PaginatedResponse, Pagination, PaginationMeta, ProcessLoss, ProductCatalog,
    ProductionCosts, ProductionPlan, ValidationErrors,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::store::{CatalogSource, OrderStore};

/// Production service for manufacturing orders
#[derive(Clone)]
pub struct ProductionService<S> {
    store: S,
}

/// Input for creating a manufacturing order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub product_name: String,
    pub manufacturing_type: ManufacturingType,
    pub concentration: Concentration,
    pub bottle_size_ml: Decimal,
    #[validate(range(min = 1, message = "Units requested must be greater than 0"))]
    pub units_requested: u32,
    pub branch_id: Uuid,
    #[serde(default)]
    pub formula: Vec<FormulaLine>,
    #[serde(default)]
    pub process_loss: ProcessLoss,
    #[serde(default)]
    pub distribution: Vec<DistributionEntry>,
    #[serde(default)]
    pub packaging_items: Vec<PackagingItem>,
    #[serde(default)]
    pub costs: ProductionCosts,
    pub manufacturing_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub due_at: Option<DateTime<Utc>>,
    pub responsible_employee_id: Option<Uuid>,
}

/// Field-wise failures of a creation request, keyed like order errors
fn input_errors(errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut fields = ValidationErrors::new();
    for (field, failures) in errors.field_errors() {
        let message = failures
            .first()
            .and_then(|failure| failure.message.as_ref())
            .map(|message| message.to_string())
            .unwrap_or_else(|| format!("{} is invalid", field));
        fields.insert(camel_case(field), message);
    }
    fields
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl<S> ProductionService<S>
where
    S: OrderStore + CatalogSource,
{
    /// Create a new ProductionService instance
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Catalog and stock snapshot for one branch
    async fn reference_data(&self, branch_id: Uuid) -> AppResult<(ProductCatalog, InventorySnapshot)> {
        let catalog = ProductCatalog::new(self.store.list_products().await?);
        let stock = InventorySnapshot::new(self.store.list_inventory(branch_id).await?);

        tracing::debug!(
            branch_id = %branch_id,
            products = catalog.len(),
            "Loaded reference data"
        );

        Ok((catalog, stock))
    }

    async fn plan(&self, order: &ManufacturingOrder) -> AppResult<ProductionPlan> {
        let (catalog, stock) = self.reference_data(order.branch_id).await?;
        Ok(plan_production(order, &catalog, &stock))
    }

    async fn fetch_existing(&self, order_id: Uuid) -> AppResult<ManufacturingOrder> {
        self.store
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Manufacturing order".to_string()))
    }

    /// Create a draft order with a freshly issued batch code.
    ///
    /// Drafts are work in progress and are stored with whatever errors they
    /// still carry; the returned plan lists them.
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<ProductionPlan> {
        input
            .validate()
            .map_err(|errors| AppError::OrderInvalid(input_errors(&errors)))?;

        let today = Utc::now().date_naive();
        let sequence = self.store.next_batch_sequence(today).await?;
        let batch_code = generate_batch_code(today, sequence);

        let mut order = ManufacturingOrder::draft(
            batch_code,
            input.product_name.trim().to_string(),
            input.manufacturing_type,
            input.concentration,
            input.bottle_size_ml,
            input.units_requested,
            input.branch_id,
        );
        order.formula = input.formula;
        order.process_loss = input.process_loss;
        order.distribution = input.distribution;
        order.packaging_items = input.packaging_items;
        order.costs = input.costs;
        order.manufacturing_date = input.manufacturing_date;
        order.expiry_date = input.expiry_date;
        order.due_at = input.due_at;
        order.responsible_employee_id = input.responsible_employee_id;

        let plan = self.plan(&order).await?;
        self.store.save_order(&plan.order).await?;

        tracing::info!(
            order_id = %plan.order.id,
            batch_code = %plan.order.batch_code,
            open_errors = plan.errors.len(),
            "Created manufacturing order"
        );

        Ok(plan)
    }

    /// Stored order with its full production plan
    pub async fn get_plan(&self, order_id: Uuid) -> AppResult<ProductionPlan> {
        let order = self.fetch_existing(order_id).await?;
        self.plan(&order).await
    }

    /// Plan an edited order without saving it
    pub async fn preview(&self, order: &ManufacturingOrder) -> AppResult<ProductionPlan> {
        self.plan(order).await
    }

    /// Commit an edited order.
    ///
    /// Identity, batch code, status and creation time stay as stored. The
    /// commit is refused while the recomputed order has validation errors,
    /// except a missing manufacturing date on a draft, which "Start
    /// production" stamps. A concurrent status change fails with a conflict.
    pub async fn update_order(
        &self,
        order_id: Uuid,
        edited: ManufacturingOrder,
    ) -> AppResult<ProductionPlan> {
        let existing = self.fetch_existing(order_id).await?;
        if existing.status == OrderStatus::Closed {
            return Err(AppError::Validation {
                field: "status".to_string(),
                message: "Closed orders cannot be edited".to_string(),
            });
        }

        let candidate = ManufacturingOrder {
            id: existing.id,
            batch_code: existing.batch_code,
            status: existing.status,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..edited
        };

        let plan = self.plan(&candidate).await?;
        let mut blocking = plan.errors.clone();
        if candidate.status == OrderStatus::Draft {
            blocking.remove("manufacturingDate");
        }
        if !blocking.is_empty() {
            tracing::debug!(order_id = %order_id, errors = %blocking, "Refused order update");
            return Err(AppError::OrderInvalid(blocking));
        }

        self.store.replace_order(&plan.order, existing.status).await?;
        tracing::info!(order_id = %order_id, "Updated manufacturing order");

        Ok(plan)
    }

    /// Move an order to the next lifecycle stage.
    ///
    /// The advanced order is returned only after the store accepted it.
    pub async fn advance_order(&self, order_id: Uuid) -> AppResult<ProductionPlan> {
        let existing = self.fetch_existing(order_id).await?;
        let (catalog, stock) = self.reference_data(existing.branch_id).await?;
        let plan = plan_production(&existing, &catalog, &stock);

        let now = Utc::now();
        let mut advanced = match plan.advance(now.date_naive()) {
            Ok(order) => order,
            Err(err) => {
                let short: Vec<&str> = plan
                    .materials
                    .shortages()
                    .map(|line| line.material_name.as_str())
                    .collect();
                tracing::warn!(
                    order_id = %order_id,
                    status = %existing.status,
                    shortages = ?short,
                    "Transition refused: {}",
                    err
                );
                return Err(err.into());
            }
        };

        advanced.updated_at = now;
        self.store.replace_order(&advanced, existing.status).await?;

        tracing::info!(
            order_id = %order_id,
            from = %existing.status,
            to = %advanced.status,
            "Advanced manufacturing order"
        );

        Ok(plan_production(&advanced, &catalog, &stock))
    }

    /// Paginated order listing, newest first
    pub async fn list_orders(
        &self,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ManufacturingOrder>> {
        let (data, total_items) = self.store.list_orders(pagination).await?;
        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(pagination, total_items),
        })
    }

    /// Employees who can be made responsible for an order
    pub async fn list_employees(&self) -> AppResult<Vec<EmployeeData>> {
        self.store.list_employees().await
    }
}
