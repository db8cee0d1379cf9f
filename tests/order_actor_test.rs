mod common;

use common::checkout_request;
use order_fulfillment::clients::OrderClient;
use order_fulfillment::inventory::{InventoryError, InventoryStore};
use order_fulfillment::model::{OrderId, OrderStatus, PaymentStatus, ProductId};
use order_fulfillment::order_actor::{validate_checkout, OrderError};
use std::time::Duration;

async fn inventory() -> InventoryStore {
    let store = InventoryStore::new(Duration::from_millis(500));
    store.register_product(ProductId(1), "Cooler", 5).await.unwrap();
    store
}

/// Real Order actor over a real inventory store.
#[tokio::test]
async fn test_order_actor_reserves_and_transitions() {
    let store = inventory().await;
    let (order_actor, client) = order_fulfillment::order_actor::new(16);
    let actor_handle = tokio::spawn(order_actor.run(store.clone()));
    let orders = OrderClient::new(client);

    let create = validate_checkout(&checkout_request(&[(1, 2)])).unwrap();
    let order_id = orders.create_order(create).await.unwrap();
    assert_eq!(order_id, OrderId(1));
    assert_eq!(store.stock_level(ProductId(1)).await.unwrap().stock_quantity, 3);

    // Paid moves a pending order to paid.
    let paid = orders.apply_payment(order_id, PaymentStatus::Paid).await.unwrap();
    assert!(paid.changed);
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert_eq!(paid.order.payment_status, PaymentStatus::Paid);

    // A late failure notification is stale.
    let stale = orders.apply_payment(order_id, PaymentStatus::Failed).await.unwrap();
    assert!(!stale.changed);
    assert_eq!(stale.order.payment_status, PaymentStatus::Paid);

    let shipped = orders.advance(order_id, OrderStatus::Shipped).await.unwrap();
    assert!(shipped.changed);
    assert_eq!(
        orders.advance(order_id, OrderStatus::Pending).await.unwrap_err(),
        OrderError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Pending,
        }
    );
    // Shipped orders can no longer be cancelled.
    assert!(matches!(
        orders.cancel(order_id).await,
        Err(OrderError::InvalidTransition { .. })
    ));
    assert_eq!(store.stock_level(ProductId(1)).await.unwrap().stock_quantity, 3);

    drop(orders);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_create_stores_nothing() {
    let store = inventory().await;
    let (order_actor, client) = order_fulfillment::order_actor::new(16);
    let actor_handle = tokio::spawn(order_actor.run(store.clone()));
    let orders = OrderClient::new(client);

    let too_many = validate_checkout(&checkout_request(&[(1, 6)])).unwrap();
    assert_eq!(
        orders.create_order(too_many).await.unwrap_err(),
        OrderError::Inventory(InventoryError::InsufficientStock {
            product_id: ProductId(1),
            requested: 6,
            available: 5,
        })
    );

    let unknown = validate_checkout(&checkout_request(&[(9, 1)])).unwrap();
    assert_eq!(
        orders.create_order(unknown).await.unwrap_err(),
        OrderError::Inventory(InventoryError::UnknownProduct(ProductId(9)))
    );

    // Nothing stored, no id consumed, no movement written.
    assert!(orders.fetch(OrderId(1)).await.is_err());
    assert_eq!(store.movements_for_product(ProductId(1)).await.len(), 1);

    let ok = validate_checkout(&checkout_request(&[(1, 5)])).unwrap();
    assert_eq!(orders.create_order(ok).await.unwrap(), OrderId(1));
    let level = store.stock_level(ProductId(1)).await.unwrap();
    assert_eq!(level.stock_quantity, 0);
    assert!(!level.in_stock);

    drop(orders);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_lock_timeout_surfaces_as_typed_error() {
    let store = inventory().await;
    let (order_actor, client) = order_fulfillment::order_actor::new(16);
    let actor_handle = tokio::spawn(order_actor.run(store.clone()));
    let orders = OrderClient::new(client);

    // Hold the row so the actor's transaction waits out its lock timeout.
    let held = store.begin([ProductId(1)]).await.unwrap();
    let create = validate_checkout(&checkout_request(&[(1, 1)])).unwrap();
    assert_eq!(
        orders.create_order(create).await.unwrap_err(),
        OrderError::Inventory(InventoryError::LockTimeout(ProductId(1)))
    );
    drop(held);
    assert_eq!(store.stock_level(ProductId(1)).await.unwrap().stock_quantity, 5);

    drop(orders);
    actor_handle.await.unwrap();
}

/// Totals are checked inside the actor too, for callers that skip `validate_checkout`.
#[tokio::test]
async fn test_overflowing_order_is_rejected_inside_the_actor() {
    let store = inventory().await;
    let (order_actor, client) = order_fulfillment::order_actor::new(16);
    let actor_handle = tokio::spawn(order_actor.run(store.clone()));
    let orders = OrderClient::new(client);

    let mut create = validate_checkout(&checkout_request(&[(1, 2)])).unwrap();
    create.lines[0].price_at_purchase = rust_decimal::Decimal::MAX;
    assert!(matches!(
        orders.create_order(create).await,
        Err(OrderError::ValidationError(_))
    ));
    assert_eq!(store.stock_level(ProductId(1)).await.unwrap().stock_quantity, 5);

    let ok = validate_checkout(&checkout_request(&[(1, 1)])).unwrap();
    assert_eq!(orders.create_order(ok).await.unwrap(), OrderId(1));

    drop(orders);
    actor_handle.await.unwrap();
}
