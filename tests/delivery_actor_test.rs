use chrono::Utc;
use order_fulfillment::clients::DeliveryClient;
use order_fulfillment::delivery_actor::DeliveryError;
use order_fulfillment::model::{DeliveryStatus, LogisticsSolution, OrderId};
use rust_decimal::Decimal;

fn empty_solution() -> LogisticsSolution {
    LogisticsSolution {
        routes: vec![],
        total_cost: Decimal::ZERO,
        estimated_delivery_date: Utc::now(),
        unrouted: vec![],
    }
}

#[tokio::test]
async fn test_delivery_status_machine() {
    let (actor, client) = order_fulfillment::delivery_actor::new(16);
    let handle = tokio::spawn(actor.run(()));
    let deliveries = DeliveryClient::new(client);

    let id = deliveries
        .create_for_order(OrderId(1), empty_solution())
        .await
        .unwrap();
    let delivery = deliveries.fetch(id).await.unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Pending);
    assert_eq!(delivery.assigned_partner, None);

    // Same status is a no-op.
    let same = deliveries.advance(id, DeliveryStatus::Pending).await.unwrap();
    assert!(!same.changed);

    let moved = deliveries.advance(id, DeliveryStatus::InTransit).await.unwrap();
    assert!(moved.changed);
    assert_eq!(moved.from, DeliveryStatus::Pending);

    assert_eq!(
        deliveries.advance(id, DeliveryStatus::Pending).await,
        Err(DeliveryError::InvalidTransition {
            from: DeliveryStatus::InTransit,
            to: DeliveryStatus::Pending,
        })
    );

    deliveries.advance(id, DeliveryStatus::Delivered).await.unwrap();
    assert!(deliveries
        .advance(id, DeliveryStatus::InTransit)
        .await
        .is_err());

    drop(deliveries);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_is_forced_and_final() {
    let (actor, client) = order_fulfillment::delivery_actor::new(16);
    let handle = tokio::spawn(actor.run(()));
    let deliveries = DeliveryClient::new(client);

    let id = deliveries
        .create_for_order(OrderId(7), empty_solution())
        .await
        .unwrap();
    let failed = deliveries.advance(id, DeliveryStatus::Failed).await.unwrap();
    assert!(failed.changed);

    for next in [DeliveryStatus::Pending, DeliveryStatus::InTransit, DeliveryStatus::Delivered] {
        assert!(deliveries.advance(id, next).await.is_err());
    }
    assert_eq!(
        deliveries.fetch(id).await.unwrap().status,
        DeliveryStatus::Failed
    );

    // Unknown delivery
    assert!(matches!(
        deliveries.advance(id.0.wrapping_add(100).into(), DeliveryStatus::InTransit).await,
        Err(DeliveryError::NotFound(_))
    ));

    drop(deliveries);
    handle.await.unwrap();
}
