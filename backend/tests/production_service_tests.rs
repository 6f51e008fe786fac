//! Production service tests
//!
//! Drives the service against the in-memory store:
//! - Draft creation and batch codes
//! - Commit refusal while an order has errors
//! - Lifecycle advancement and the completion stock gate
//! - Failed saves leave the stored order untouched

use chrono::Utc;
use fragrance_production_backend::services::{CreateOrderInput, InMemoryStore, OrderStore, ProductionService};
use fragrance_production_backend::AppError;
use rust_decimal::Decimal;
use shared::{
    Concentration, DistributionEntry, EmployeeData, FormulaLine, InventoryItem, ManufacturingOrder,
    ManufacturingType, MaterialKind, OrderStatus, PackagingItem, Pagination, ProcessLoss, Product,
    TransitionError,
};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const BRANCH: Uuid = Uuid::from_u128(0x9a1d_3c55_0e2f_4b7a_8c3d_5e6f_7a8b_9c0d);
const ROSE_OUD: Uuid = Uuid::from_u128(1);
const ALCOHOL: Uuid = Uuid::from_u128(2);
const WATER: Uuid = Uuid::from_u128(3);
const BOTTLE: Uuid = Uuid::from_u128(10);

fn products() -> Vec<Product> {
    let product = |id: Uuid, name: &str, category: &str, density: Option<&str>| Product {
        id,
        name: name.to_string(),
        category: category.to_string(),
        density: density.map(dec),
    };
    vec![
        product(ROSE_OUD, "Rose oud accord", "AROMA_OIL", Some("0.95")),
        product(ALCOHOL, "Perfumer's alcohol", "ETHANOL", Some("0.789")),
        product(WATER, "DI water", "DI_WATER", None),
        product(BOTTLE, "50ml flacon", "PACKAGING", None),
    ]
}

fn stock(quantity: &str) -> Vec<InventoryItem> {
    [ROSE_OUD, ALCOHOL, WATER, BOTTLE]
        .into_iter()
        .map(|product_id| InventoryItem {
            product_id,
            branch_id: BRANCH,
            quantity: dec(quantity),
        })
        .collect()
}

fn employees() -> Vec<EmployeeData> {
    vec![EmployeeData {
        id: Uuid::from_u128(100),
        name: "Malee".to_string(),
    }]
}

fn service_with(store: &InMemoryStore) -> ProductionService<InMemoryStore> {
    ProductionService::new(store.clone())
}

fn formula() -> Vec<FormulaLine> {
    let line = |material_id: Uuid, name: &str, kind: MaterialKind, pct: &str| FormulaLine {
        material_id,
        material_name: name.to_string(),
        kind,
        percentage: dec(pct),
        density: None,
    };
    vec![
        line(ROSE_OUD, "Rose oud accord", MaterialKind::AromaOil, "20"),
        line(ALCOHOL, "Perfumer's alcohol", MaterialKind::Ethanol, "75"),
        line(WATER, "DI water", MaterialKind::DiWater, "5"),
    ]
}

fn create_input() -> CreateOrderInput {
    CreateOrderInput {
        product_name: "Rose Oud".to_string(),
        manufacturing_type: ManufacturingType::Contract,
        concentration: Concentration::EauDeParfum,
        bottle_size_ml: dec("50"),
        units_requested: 1000,
        branch_id: BRANCH,
        formula: formula(),
        process_loss: ProcessLoss {
            mixing_loss_pct: dec("2"),
            filtration_loss_pct: dec("1"),
            filling_loss_pct: dec("0.5"),
        },
        distribution: vec![
            DistributionEntry {
                location_name: "Bangkok flagship".to_string(),
                units: 600,
            },
            DistributionEntry {
                location_name: "Chiang Mai".to_string(),
                units: 400,
            },
        ],
        packaging_items: vec![PackagingItem {
            product_id: BOTTLE,
            name: "50ml flacon".to_string(),
            qty_per_unit: Decimal::ONE,
        }],
        costs: Default::default(),
        manufacturing_date: None,
        expiry_date: None,
        due_at: None,
        responsible_employee_id: None,
    }
}

async fn stored_status(store: &InMemoryStore, id: Uuid) -> OrderStatus {
    store.fetch_order(id).await.unwrap().unwrap().status
}

#[tokio::test]
async fn test_create_order_issues_sequential_batch_codes() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let day = Utc::now().date_naive().format("%Y%m%d").to_string();

    let first = service.create_order(create_input()).await.unwrap();
    let second = service.create_order(create_input()).await.unwrap();

    assert_eq!(first.order.batch_code, format!("MO-{}-0001", day));
    assert_eq!(second.order.batch_code, format!("MO-{}-0002", day));
    assert_eq!(first.order.status, OrderStatus::Draft);
    assert_eq!(first.order.batch_yield.expected_units, 965);
    // Drafts are stored even while the date is still missing
    assert!(first.errors.contains_key("manufacturingDate"));
    assert!(store.fetch_order(first.order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_order_rejects_blank_request_fields() {
    let store = InMemoryStore::new();
    let service = service_with(&store);
    let mut input = create_input();
    input.product_name = String::new();
    input.units_requested = 0;

    match service.create_order(input).await {
        Err(AppError::OrderInvalid(errors)) => {
            assert!(errors.contains_key("productName"));
            assert!(errors.contains_key("unitsRequested"));
        }
        other => panic!("expected invalid order, got {:?}", other.map(|p| p.order.id)),
    }
}

#[tokio::test]
async fn test_plan_uses_catalog_density() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let created = service.create_order(create_input()).await.unwrap();

    let plan = service.get_plan(created.order.id).await.unwrap();
    let grams: Vec<Decimal> = plan.scaled_formula.iter().map(|l| l.required_g).collect();

    assert_eq!(grams, vec![dec("9500"), dec("29587.5"), dec("2500")]);
    assert!(plan.materials.all_sufficient);
    assert!(plan.packaging.all_sufficient);
}

#[tokio::test]
async fn test_get_missing_order_is_not_found() {
    let service = service_with(&InMemoryStore::new());

    assert!(matches!(
        service.get_plan(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_advance_stamps_manufacturing_date() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let created = service.create_order(create_input()).await.unwrap();

    let started = service.advance_order(created.order.id).await.unwrap();

    assert_eq!(started.order.status, OrderStatus::InProgress);
    assert_eq!(started.order.manufacturing_date, Some(Utc::now().date_naive()));
    assert_eq!(started.next_status, Some(OrderStatus::Macerating));
    assert_eq!(stored_status(&store, created.order.id).await, OrderStatus::InProgress);
}

#[tokio::test]
async fn test_short_distribution_refuses_advance() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let mut input = create_input();
    input.distribution[0].units = 500;
    let created = service.create_order(input).await.unwrap();

    match service.advance_order(created.order.id).await {
        Err(AppError::TransitionRefused(TransitionError::ValidationFailed { errors, .. })) => {
            assert_eq!(
                errors.get("distribution"),
                Some("Distributed units (900) must equal units requested (1000)")
            );
        }
        other => panic!("expected refusal, got {:?}", other.map(|p| p.order.status)),
    }
    assert_eq!(stored_status(&store, created.order.id).await, OrderStatus::Draft);
}

#[tokio::test]
async fn test_failed_save_leaves_stored_order_untouched() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let created = service.create_order(create_input()).await.unwrap();

    store.set_fail_saves(true);
    let result = service.advance_order(created.order.id).await;

    assert!(matches!(result, Err(AppError::Store(_))));
    let stored = store.fetch_order(created.order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Draft);
    assert_eq!(stored.manufacturing_date, None);

    store.set_fail_saves(false);
    let started = service.advance_order(created.order.id).await.unwrap();
    assert_eq!(started.order.status, OrderStatus::InProgress);
}

#[tokio::test]
async fn test_completion_requires_stock() {
    let store = InMemoryStore::with_reference_data(products(), stock("10"), employees());
    let service = service_with(&store);
    let created = service.create_order(create_input()).await.unwrap();
    let id = created.order.id;

    // Shortages do not block the early stages
    for expected in [
        OrderStatus::InProgress,
        OrderStatus::Macerating,
        OrderStatus::Qc,
        OrderStatus::Packaging,
    ] {
        let plan = service.advance_order(id).await.unwrap();
        assert_eq!(plan.order.status, expected);
    }

    let refused = service.advance_order(id).await;
    assert!(matches!(
        refused,
        Err(AppError::TransitionRefused(TransitionError::InsufficientStock { .. }))
    ));
    assert_eq!(stored_status(&store, id).await, OrderStatus::Packaging);
}

#[tokio::test]
async fn test_full_lifecycle_ends_closed() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let id = service.create_order(create_input()).await.unwrap().order.id;

    let mut last = OrderStatus::Draft;
    while let Ok(plan) = service.advance_order(id).await {
        assert_eq!(Some(plan.order.status), last.next());
        last = plan.order.status;
    }

    assert_eq!(last, OrderStatus::Closed);
    assert!(matches!(
        service.advance_order(id).await,
        Err(AppError::TransitionRefused(TransitionError::Terminal { .. }))
    ));
}

#[tokio::test]
async fn test_update_refuses_invalid_formula() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let mut input = create_input();
    input.manufacturing_date = Some(Utc::now().date_naive());
    let created = service.create_order(input).await.unwrap();
    assert!(created.is_committable());

    let mut edited = created.order.clone();
    edited.formula[1].percentage = dec("70");
    match service.update_order(edited.id, edited).await {
        Err(AppError::OrderInvalid(errors)) => assert!(errors.contains_key("formula")),
        other => panic!("expected invalid order, got {:?}", other.map(|p| p.order.id)),
    }
    let stored = store.fetch_order(created.order.id).await.unwrap().unwrap();
    assert_eq!(stored.formula[1].percentage, dec("75"));

    let mut edited = created.order.clone();
    edited.units_requested = 2000;
    edited.distribution[0].units = 1600;
    edited.batch_code = "tampered".to_string();
    edited.status = OrderStatus::Closed;
    let updated = service.update_order(created.order.id, edited).await.unwrap();

    assert_eq!(updated.order.batch_code, created.order.batch_code);
    assert_eq!(updated.order.status, OrderStatus::Draft);
    assert_eq!(updated.order.batch_yield.theoretical_ml, dec("100000"));
}

#[tokio::test]
async fn test_draft_without_date_can_be_edited() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let mut input = create_input();
    input.formula[1].percentage = dec("70");
    let created = service.create_order(input).await.unwrap();
    assert!(created.errors.contains_key("formula"));
    assert!(created.errors.contains_key("manufacturingDate"));

    let mut edited = created.order.clone();
    edited.formula[1].percentage = dec("75");
    let updated = service.update_order(created.order.id, edited).await.unwrap();

    assert!(!updated.errors.contains_key("formula"));
    assert_eq!(updated.order.manufacturing_date, None);
    let stored = store.fetch_order(created.order.id).await.unwrap().unwrap();
    assert_eq!(stored.formula[1].percentage, dec("75"));

    // The date is still required once production has started
    let started = service.advance_order(created.order.id).await.unwrap();
    let mut edited = started.order.clone();
    edited.manufacturing_date = None;
    match service.update_order(created.order.id, edited).await {
        Err(AppError::OrderInvalid(errors)) => assert!(errors.contains_key("manufacturingDate")),
        other => panic!("expected invalid order, got {:?}", other.map(|p| p.order.id)),
    }
}

#[tokio::test]
async fn test_stale_status_write_is_a_conflict() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let mut input = create_input();
    input.manufacturing_date = Some(Utc::now().date_naive());
    let created = service.create_order(input).await.unwrap();

    // An edit read while DRAFT lands after the order was started
    service.advance_order(created.order.id).await.unwrap();
    let mut stale = created.order.clone();
    stale.units_requested = 2000;
    let result = store.replace_order(&stale, OrderStatus::Draft).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = store.fetch_order(created.order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::InProgress);
    assert_eq!(stored.units_requested, 1000);
    assert_eq!(
        AppError::Conflict(String::new()).status_code(),
        axum::http::StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_replace_of_unknown_order_is_not_found() {
    let store = InMemoryStore::new();
    let order = ManufacturingOrder::draft(
        "MO-20240315-0001".to_string(),
        "Rose Oud".to_string(),
        ManufacturingType::Internal,
        Concentration::EauDeParfum,
        dec("50"),
        1000,
        BRANCH,
    );

    assert!(matches!(
        store.replace_order(&order, OrderStatus::Draft).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_preview_does_not_save() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    let created = service.create_order(create_input()).await.unwrap();

    let mut edited = created.order.clone();
    edited.units_requested = 10;
    let preview = service.preview(&edited).await.unwrap();

    assert_eq!(preview.order.batch_yield.theoretical_ml, dec("500"));
    assert!(preview.errors.contains_key("distribution"));
    let stored = store.fetch_order(created.order.id).await.unwrap().unwrap();
    assert_eq!(stored.units_requested, 1000);
}

#[tokio::test]
async fn test_list_orders_and_employees() {
    let store = InMemoryStore::with_reference_data(products(), stock("100000"), employees());
    let service = service_with(&store);
    for _ in 0..3 {
        service.create_order(create_input()).await.unwrap();
    }

    let page = service
        .list_orders(&Pagination {
            page: 2,
            per_page: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.total_items, 3);
    assert_eq!(page.pagination.total_pages, 2);

    let staff = service.list_employees().await.unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].name, "Malee");
}
