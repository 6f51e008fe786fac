//! Route definitions for the Fragrance Production Engine

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/manufacturing", manufacturing_routes())
}

/// Manufacturing order routes
fn manufacturing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/orders/:order_id",
            get(handlers::get_order).put(handlers::update_order),
        )
        .route("/orders/:order_id/advance", post(handlers::advance_order))
        .route("/preview", post(handlers::preview_order))
        .route("/employees", get(handlers::list_employees))
}
