//! PostgreSQL-backed order store
//!
//! Orders live as JSONB documents next to a few indexed columns used for
//! listing. Reference data comes from plain relational tables.

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{EmployeeData, InventoryItem, ManufacturingOrder, OrderStatus, Pagination, Product};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::store::{CatalogSource, OrderStore};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn decode_order(document: serde_json::Value) -> AppResult<ManufacturingOrder> {
    Ok(serde_json::from_value(document).context("decoding stored manufacturing order")?)
}

#[async_trait]
impl OrderStore for PgStore {
    async fn fetch_order(&self, id: Uuid) -> AppResult<Option<ManufacturingOrder>> {
        let document = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT document FROM manufacturing_orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        document.map(decode_order).transpose()
    }

    async fn list_orders(&self, pagination: &Pagination) -> AppResult<(Vec<ManufacturingOrder>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM manufacturing_orders")
            .fetch_one(&self.db)
            .await?;

        let documents = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT document
            FROM manufacturing_orders
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(pagination.per_page))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let orders = documents
            .into_iter()
            .map(decode_order)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((orders, total.max(0) as u64))
    }

    async fn save_order(&self, order: &ManufacturingOrder) -> AppResult<()> {
        let document = serde_json::to_value(order).context("encoding manufacturing order")?;

        sqlx::query(
            r#"
            INSERT INTO manufacturing_orders
                (id, batch_code, status, branch_id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                branch_id = EXCLUDED.branch_id,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(order.id)
        .bind(&order.batch_code)
        .bind(order.status.as_str())
        .bind(order.branch_id)
        .bind(document)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn replace_order(
        &self,
        order: &ManufacturingOrder,
        expected_status: OrderStatus,
    ) -> AppResult<()> {
        let document = serde_json::to_value(order).context("encoding manufacturing order")?;

        let updated = sqlx::query(
            r#"
            UPDATE manufacturing_orders
            SET status = $2, branch_id = $3, document = $4, updated_at = $5
            WHERE id = $1 AND status = $6
            "#,
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.branch_id)
        .bind(document)
        .bind(order.updated_at)
        .bind(expected_status.as_str())
        .execute(&self.db)
        .await?
        .rows_affected();

        if updated == 0 {
            return match self.fetch_order(order.id).await? {
                Some(stored) => Err(AppError::Conflict(format!(
                    "order is {} but {} was expected",
                    stored.status, expected_status
                ))),
                None => Err(AppError::NotFound("Manufacturing order".to_string())),
            };
        }

        Ok(())
    }

    async fn next_batch_sequence(&self, day: NaiveDate) -> AppResult<u32> {
        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO batch_sequences (production_day, last_value)
            VALUES ($1, 1)
            ON CONFLICT (production_day)
                DO UPDATE SET last_value = batch_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(day)
        .fetch_one(&self.db)
        .await?;

        Ok(sequence.max(0) as u32)
    }
}

#[async_trait]
impl CatalogSource for PgStore {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, Option<Decimal>)>(
            "SELECT id, name, category, density FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Product {
                id: r.0,
                name: r.1,
                category: r.2,
                density: r.3,
            })
            .collect())
    }

    async fn list_inventory(&self, branch_id: Uuid) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Decimal)>(
            "SELECT product_id, branch_id, quantity FROM inventory_items WHERE branch_id = $1",
        )
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| InventoryItem {
                product_id: r.0,
                branch_id: r.1,
                quantity: r.2,
            })
            .collect())
    }

    async fn list_employees(&self) -> AppResult<Vec<EmployeeData>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM employees ORDER BY name")
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| EmployeeData { id: r.0, name: r.1 })
            .collect())
    }
}
