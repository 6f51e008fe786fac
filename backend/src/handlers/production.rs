//! Manufacturing order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{ManufacturingOrder, Pagination};
use uuid::Uuid;

use crate::services::{CreateOrderInput, PgStore, ProductionService};
use crate::AppState;

fn production_service(state: &AppState) -> ProductionService<PgStore> {
    ProductionService::new(PgStore::new(state.db.clone()))
}

/// List manufacturing orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> impl IntoResponse {
    match production_service(&state).list_orders(&pagination).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a draft manufacturing order
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> impl IntoResponse {
    match production_service(&state).create_order(input).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an order with its production plan
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match production_service(&state).get_plan(order_id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Save an edited order
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(order): Json<ManufacturingOrder>,
) -> impl IntoResponse {
    match production_service(&state).update_order(order_id, order).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Move an order to its next status
pub async fn advance_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match production_service(&state).advance_order(order_id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recompute and check an unsaved order
pub async fn preview_order(
    State(state): State<AppState>,
    Json(order): Json<ManufacturingOrder>,
) -> impl IntoResponse {
    match production_service(&state).preview(&order).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Employees available as order owners
pub async fn list_employees(State(state): State<AppState>) -> impl IntoResponse {
    match production_service(&state).list_employees().await {
        Ok(employees) => (StatusCode::OK, Json(serde_json::json!({ "employees": employees }))).into_response(),
        Err(e) => e.into_response(),
    }
}
