mod common;

use common::{checkout_request, test_config};
use order_fulfillment::delivery_actor::DeliveryError;
use order_fulfillment::error::FulfillmentError;
use order_fulfillment::lifecycle::FulfillmentSystem;
use order_fulfillment::model::{
    DeliveryStatus, LogisticsSolution, MovementKind, OrderStatus, PaymentStatus, ProductId,
};
use order_fulfillment::routing::RoutingError;
use rust_decimal::Decimal;

async fn stock(system: &FulfillmentSystem, product: u32) -> u32 {
    system
        .inventory
        .stock_level(ProductId(product))
        .await
        .expect("Unknown product")
        .stock_quantity
}

/// Full end-to-end checkout with all real actors.
#[tokio::test]
async fn test_checkout_reserves_stock_and_opens_delivery() {
    let system = FulfillmentSystem::start(&test_config())
        .await
        .expect("Failed to start system");

    let receipt = system
        .checkout
        .checkout(checkout_request(&[(1, 2)]))
        .await
        .expect("Checkout failed");

    // 2 x 10.00 + 4.99 shipping
    assert_eq!(receipt.total, Decimal::new(2499, 2));
    assert!(receipt.tracking_number.starts_with("TRK-"));
    assert!(receipt.unrouted.is_empty());

    // Stock 5 -> 3, with one sale movement for this order
    assert_eq!(stock(&system, 1).await, 3);
    let movements = system.inventory.movements_for_order(receipt.order_id).await;
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].delta, -2);
    assert_eq!(movements[0].kind, MovementKind::Sale);

    let order = system.order_client.fetch(receipt.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price_at_purchase, Decimal::new(1000, 2));

    let delivery = system
        .delivery_client
        .fetch(receipt.delivery_id)
        .await
        .unwrap();
    assert_eq!(delivery.order_id, receipt.order_id);
    assert_eq!(delivery.status, DeliveryStatus::Pending);
    assert_eq!(delivery.assigned_partner.as_deref(), Some("swift"));
    assert_eq!(delivery.tracking_number, receipt.tracking_number);
    assert_eq!(delivery.routes.len(), 1);

    let by_order = system
        .delivery_client
        .find_by_order(receipt.order_id)
        .await
        .unwrap();
    assert_eq!(by_order.map(|d| d.id), Some(receipt.delivery_id));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_insufficient_stock_rejects_whole_order() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    // Product 2 has plenty; product 1 does not. Neither may move.
    let err = system
        .checkout
        .checkout(checkout_request(&[(2, 1), (1, 10)]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FulfillmentError::InsufficientStock {
            product_id: ProductId(1),
            requested: 10,
            available: 5,
        }
    );

    assert_eq!(stock(&system, 1).await, 5);
    assert_eq!(stock(&system, 2).await, 100);
    // Only the opening balances are in the ledger.
    assert_eq!(system.inventory.movements_for_product(ProductId(1)).await.len(), 1);
    assert_eq!(system.inventory.movements_for_product(ProductId(2)).await.len(), 1);
    assert!(system.inventory.reconcile().await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unroutable_order_touches_no_stock() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    let err = system
        .checkout
        .checkout(checkout_request(&[(3, 1)]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FulfillmentError::Routing(RoutingError::Unroutable(vec![ProductId(3)]))
    );
    assert_eq!(stock(&system, 3).await, 10);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_cart_is_rejected_before_reservation() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    for cart in [&[][..], &[(1, 0)][..], &[(1, -2)][..]] {
        let err = system
            .checkout
            .checkout(checkout_request(cart))
            .await
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::Validation(_)), "{err:?}");
    }
    assert_eq!(stock(&system, 1).await, 5);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cancellation_restores_stock_and_ledger() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    let receipt = system
        .checkout
        .checkout(checkout_request(&[(1, 4), (2, 10)]))
        .await
        .unwrap();
    assert_eq!(stock(&system, 1).await, 1);
    assert_eq!(stock(&system, 2).await, 90);

    let result = system.order_client.cancel(receipt.order_id).await.unwrap();
    assert!(result.changed);
    assert_eq!(result.order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&system, 1).await, 5);
    assert_eq!(stock(&system, 2).await, 100);

    let movements = system.inventory.movements_for_order(receipt.order_id).await;
    assert_eq!(
        movements.iter().filter(|m| m.kind == MovementKind::Return).count(),
        2
    );
    assert!(system.inventory.reconcile().await.unwrap().is_empty());

    // Second cancel is a no-op.
    let again = system.order_client.cancel(receipt.order_id).await.unwrap();
    assert!(!again.changed);
    assert_eq!(stock(&system, 1).await, 5);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_one_delivery_per_order() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    let receipt = system
        .checkout
        .checkout(checkout_request(&[(2, 1)]))
        .await
        .unwrap();
    let delivery = system
        .delivery_client
        .fetch(receipt.delivery_id)
        .await
        .unwrap();

    let again = system
        .delivery_client
        .create_for_order(
            receipt.order_id,
            LogisticsSolution {
                routes: delivery.routes.clone(),
                total_cost: delivery.shipping_cost,
                estimated_delivery_date: delivery.estimated_delivery_date,
                unrouted: vec![],
            },
        )
        .await;
    assert_eq!(again, Err(DeliveryError::AlreadyExists(receipt.order_id)));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_oversized_total_is_rejected_and_checkout_keeps_working() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();

    let mut huge = checkout_request(&[(1, 3)]);
    huge.cart_items[0].price_at_purchase = Decimal::MAX;
    let err = system.checkout.checkout(huge).await.unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(_)), "{err:?}");
    assert_eq!(stock(&system, 1).await, 5);

    let receipt = system
        .checkout
        .checkout(checkout_request(&[(1, 1)]))
        .await
        .expect("order actor should still be running");
    assert_eq!(receipt.total, Decimal::new(1499, 2));
    assert_eq!(stock(&system, 1).await, 4);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let mut zero_mailbox = test_config();
    zero_mailbox.actors.mailbox_capacity = 0;
    let mut zero_prune = test_config();
    zero_prune.payments.prune_interval_secs = 0;

    for config in [zero_mailbox, zero_prune] {
        match FulfillmentSystem::start(&config).await {
            Err(FulfillmentError::Validation(msg)) => assert!(msg.contains("must be positive"), "{msg}"),
            Err(other) => panic!("expected a validation error, got {other:?}"),
            Ok(_) => panic!("invalid config started a system"),
        }
    }
}
