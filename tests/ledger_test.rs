mod common;

use chrono::Utc;
use uuid::Uuid;

use restock_api::entities::MovementType;
use restock_api::errors::ServiceError;
use restock_api::services::ledger::{ApplyMovementCommand, ProvisionRecordCommand};

use common::spawn_app;

fn movement(
    product_id: Uuid,
    from: Option<Uuid>,
    to: Option<Uuid>,
    quantity: i32,
    movement_type: MovementType,
) -> ApplyMovementCommand {
    ApplyMovementCommand {
        product_id,
        from_location_id: from,
        to_location_id: to,
        quantity,
        movement_type,
        movement_date: None,
        reason: None,
        created_by: Some("test".into()),
    }
}

#[tokio::test]
async fn provisioned_record_reports_derived_status() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let status = app.ledger.get_inventory_status(product, store).await.unwrap();
    assert_eq!(status.record.stock_status, "healthy");
    assert!(!status.record.needs_restock);
    assert_eq!(status.ideal_stock, 160);
    // gap to ideal (60) beats one cycle of consumption (2.0 * 14 = 28)
    assert_eq!(status.suggested_quantity, 60);
}

#[tokio::test]
async fn provisioning_the_same_pair_twice_conflicts() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let err = app
        .ledger
        .provision_record(ProvisionRecordCommand {
            product_id: product,
            location_id: store,
            current_stock: 5,
            minimum_stock: 1,
            maximum_stock: 10,
            ideal_stock_percentage: 50,
            restock_cycle_days: 7,
            average_daily_sales: rust_decimal::Decimal::ONE,
            unit_cost: rust_decimal::Decimal::ONE,
            retail_price: rust_decimal::Decimal::ONE,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn inbound_transfer_credits_stock_and_stamps_restock_date() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 50, 20, 200).await;

    let outcome = app
        .ledger
        .apply_movement(movement(product, None, Some(store), 40, MovementType::Transfer))
        .await
        .unwrap();

    let destination = outcome.destination.unwrap();
    assert_eq!(destination.current_stock, 90);
    assert_eq!(destination.last_restock_date, Some(Utc::now().date_naive()));
    assert!(outcome.source.is_none());
    assert_eq!(outcome.movement.destination_stock_before, Some(50));
    assert_eq!(outcome.movement.destination_stock_after, Some(90));
}

#[tokio::test]
async fn sale_debits_stock_without_touching_restock_date() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let outcome = app
        .ledger
        .apply_movement(movement(product, Some(store), None, 30, MovementType::Sale))
        .await
        .unwrap();

    let source = outcome.source.unwrap();
    assert_eq!(source.current_stock, 70);
    assert_eq!(source.last_restock_date, None);
}

#[tokio::test]
async fn oversized_sale_is_rejected_with_no_partial_effect() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let err = app
        .ledger
        .apply_movement(movement(product, Some(store), None, 150, MovementType::Sale))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let status = app.ledger.get_inventory_status(product, store).await.unwrap();
    assert_eq!(status.record.current_stock, 100);
}

#[tokio::test]
async fn adjustment_sets_an_absolute_level() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let outcome = app
        .ledger
        .apply_movement(movement(product, None, Some(store), 5, MovementType::Adjustment))
        .await
        .unwrap();

    let record = outcome.destination.unwrap();
    assert_eq!(record.current_stock, 5);
    // 5 <= 20 * 0.5, so the write-down lands in critical
    assert_eq!(record.stock_status, "critical");
    assert!(record.needs_restock);
}

#[tokio::test]
async fn adjustment_with_a_source_location_is_invalid() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let err = app
        .ledger
        .apply_movement(movement(
            product,
            Some(store),
            None,
            5,
            MovementType::Adjustment,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn negative_adjustment_is_invalid() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;

    let err = app
        .ledger
        .apply_movement(movement(
            product,
            None,
            Some(store),
            -5,
            MovementType::Adjustment,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn transfer_moves_stock_between_stores() {
    let app = spawn_app().await;
    let warehouse = app.location("Warehouse").await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, warehouse, 500, 50, 1000).await;
    app.provision(product, store, 10, 20, 200).await;

    let outcome = app
        .ledger
        .apply_movement(movement(
            product,
            Some(warehouse),
            Some(store),
            60,
            MovementType::Transfer,
        ))
        .await
        .unwrap();

    assert_eq!(outcome.source.unwrap().current_stock, 440);
    let destination = outcome.destination.unwrap();
    assert_eq!(destination.current_stock, 70);
    assert_eq!(destination.last_restock_date, Some(Utc::now().date_naive()));
    assert_eq!(outcome.movement.source_stock_before, Some(500));
    assert_eq!(outcome.movement.source_stock_after, Some(440));
    assert_eq!(outcome.movement.destination_stock_before, Some(10));
    assert_eq!(outcome.movement.destination_stock_after, Some(70));
}

#[tokio::test]
async fn failed_transfer_leaves_both_stores_untouched() {
    let app = spawn_app().await;
    let warehouse = app.location("Warehouse").await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, warehouse, 30, 50, 1000).await;
    app.provision(product, store, 10, 20, 200).await;

    let err = app
        .ledger
        .apply_movement(movement(
            product,
            Some(warehouse),
            Some(store),
            60,
            MovementType::Transfer,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let warehouse_status = app
        .ledger
        .get_inventory_status(product, warehouse)
        .await
        .unwrap();
    let store_status = app.ledger.get_inventory_status(product, store).await.unwrap();
    assert_eq!(warehouse_status.record.current_stock, 30);
    assert_eq!(store_status.record.current_stock, 10);
}

#[tokio::test]
async fn opposing_transfers_net_to_zero() {
    let app = spawn_app().await;
    let a = app.location("Store A").await;
    let b = app.location("Store B").await;
    let product = Uuid::new_v4();
    app.provision(product, a, 100, 10, 200).await;
    app.provision(product, b, 100, 10, 200).await;

    app.ledger
        .apply_movement(movement(product, Some(a), Some(b), 25, MovementType::Transfer))
        .await
        .unwrap();
    app.ledger
        .apply_movement(movement(product, Some(b), Some(a), 25, MovementType::Transfer))
        .await
        .unwrap();

    let status_a = app.ledger.get_inventory_status(product, a).await.unwrap();
    let status_b = app.ledger.get_inventory_status(product, b).await.unwrap();
    assert_eq!(status_a.record.current_stock, 100);
    assert_eq!(status_b.record.current_stock, 100);
}

#[tokio::test]
async fn concurrent_sales_never_lose_an_update() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 5, 200).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = app.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .apply_movement(ApplyMovementCommand {
                    product_id: product,
                    from_location_id: Some(store),
                    to_location_id: None,
                    quantity: 2,
                    movement_type: MovementType::Sale,
                    movement_date: None,
                    reason: None,
                    created_by: None,
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let status = app.ledger.get_inventory_status(product, store).await.unwrap();
    assert_eq!(status.record.current_stock, 60);

    let (_, total) = app.ledger.list_movements(product, store, 1, 50).await.unwrap();
    assert_eq!(total, 20);
}

#[tokio::test]
async fn movement_history_paginates_newest_first() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 5, 200).await;

    for quantity in [1, 2, 3] {
        app.ledger
            .apply_movement(movement(product, Some(store), None, quantity, MovementType::Sale))
            .await
            .unwrap();
    }

    let (page_one, total) = app.ledger.list_movements(product, store, 1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page_one.len(), 2);

    let (page_two, _) = app.ledger.list_movements(product, store, 2, 2).await.unwrap();
    assert_eq!(page_two.len(), 1);
}

#[tokio::test]
async fn low_stock_crossing_flags_the_record_for_attention() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 25, 20, 200).await;

    app.ledger
        .apply_movement(movement(product, Some(store), None, 10, MovementType::Sale))
        .await
        .unwrap();

    let status = app.ledger.get_inventory_status(product, store).await.unwrap();
    assert_eq!(status.record.stock_status, "low");
    assert!(status.record.needs_restock);

    let attention = app.ledger.list_attention_records().await.unwrap();
    assert!(attention.iter().any(|r| r.product_id == product));
}

#[tokio::test]
async fn deactivated_record_keeps_its_history() {
    let app = spawn_app().await;
    let store = app.location("Northgate").await;
    let product = Uuid::new_v4();
    app.provision(product, store, 100, 20, 200).await;
    app.ledger
        .apply_movement(movement(product, Some(store), None, 10, MovementType::Sale))
        .await
        .unwrap();

    let record = app.ledger.deactivate_record(product, store).await.unwrap();
    assert!(!record.active);

    let (movements, total) = app.ledger.list_movements(product, store, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(movements[0].quantity, 10);
}
