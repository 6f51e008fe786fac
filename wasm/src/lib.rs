//! WebAssembly module for the Fragrance Production Engine
//!
//! Lets the order form re-derive everything in the browser on each edit:
//! - Yield and cost recomputation
//! - Full production plans (formula scaling, stock checks, validation)
//! - Lifecycle transitions
//!
//! Every binding takes and returns JSON strings in the same shape the
//! backend serves.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::lifecycle::*;
pub use shared::models::*;
pub use shared::planning::*;
pub use shared::validation::*;

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn build_plan(order_json: &str, products_json: &str, inventory_json: &str) -> Result<ProductionPlan, String> {
    let order: ManufacturingOrder = parse(order_json, "order")?;
    let products: Vec<Product> = parse(products_json, "products")?;
    let inventory: Vec<InventoryItem> = parse(inventory_json, "inventory")?;

    Ok(plan_production(
        &order,
        &ProductCatalog::new(products),
        &InventorySnapshot::new(inventory),
    ))
}

fn recompute_json(order_json: &str) -> Result<String, String> {
    let order: ManufacturingOrder = parse(order_json, "order")?;
    render(&recompute(&order))
}

fn validate_json(order_json: &str) -> Result<String, String> {
    let order: ManufacturingOrder = parse(order_json, "order")?;
    render(&validate_order(&recompute(&order)))
}

fn advance_json(
    order_json: &str,
    products_json: &str,
    inventory_json: &str,
    today: NaiveDate,
) -> Result<String, String> {
    let plan = build_plan(order_json, products_json, inventory_json)?;
    let advanced = plan.advance(today).map_err(|e| e.to_string())?;
    render(&advanced)
}

fn browser_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

/// Recompute yield and cost totals of an order
#[wasm_bindgen]
pub fn recompute_order(order_json: &str) -> Result<String, JsValue> {
    recompute_json(order_json).map_err(|e| JsValue::from_str(&e))
}

/// Build the full production plan for an order against catalog and stock arrays
#[wasm_bindgen]
pub fn plan_order(order_json: &str, products_json: &str, inventory_json: &str) -> Result<String, JsValue> {
    build_plan(order_json, products_json, inventory_json)
        .and_then(|plan| render(&plan))
        .map_err(|e| JsValue::from_str(&e))
}

/// Validation error map of an order, as a JSON object
#[wasm_bindgen]
pub fn validate_order_fields(order_json: &str) -> Result<String, JsValue> {
    validate_json(order_json).map_err(|e| JsValue::from_str(&e))
}

/// Advance an order to its next status using today's browser date
#[wasm_bindgen]
pub fn advance_order(order_json: &str, products_json: &str, inventory_json: &str) -> Result<String, JsValue> {
    let today = browser_today().ok_or_else(|| JsValue::from_str("Browser date is unavailable"))?;
    advance_json(order_json, products_json, inventory_json, today).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str(&format!("Transition refused: {}", e)));
        JsValue::from_str(&e)
    })
}

/// Next status in the production lifecycle, if any
#[wasm_bindgen]
pub fn next_order_status(status: &str) -> Option<String> {
    OrderStatus::from_str(status)
        .and_then(|s| s.next())
        .map(|s| s.as_str().to_string())
}

/// Calculate expected deliverable units after process losses
#[wasm_bindgen]
pub fn calculate_expected_units(
    units_requested: u32,
    bottle_size_ml: f64,
    mixing_loss_pct: f64,
    filtration_loss_pct: f64,
    filling_loss_pct: f64,
) -> u32 {
    let to_decimal = |value: f64| Decimal::try_from(value).unwrap_or(Decimal::ZERO);
    let bottle = to_decimal(bottle_size_ml);
    let loss = ProcessLoss {
        mixing_loss_pct: to_decimal(mixing_loss_pct),
        filtration_loss_pct: to_decimal(filtration_loss_pct),
        filling_loss_pct: to_decimal(filling_loss_pct),
    };
    calculate_yield(units_requested, bottle, &loss, None, None).expected_units
}

/// Calculate yield percentage of actual over theoretical volume
#[wasm_bindgen]
pub fn calculate_yield_percentage(actual_ml: f64, theoretical_ml: f64) -> f64 {
    let actual = Decimal::try_from(actual_ml).ok();
    let theoretical = Decimal::try_from(theoretical_ml).unwrap_or(Decimal::ZERO);
    yield_percentage(actual, theoretical).to_f64().unwrap_or(0.0)
}
