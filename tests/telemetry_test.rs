mod common;

use chrono::{Duration, Utc};
use common::{checkout_request, test_config};
use order_fulfillment::broadcast::BroadcastHub;
use order_fulfillment::lifecycle::config::TelemetryConfig;
use order_fulfillment::lifecycle::FulfillmentSystem;
use order_fulfillment::model::{
    AlertKind, DeliveryId, DeliveryStatus, OrderStatus, TelemetryReading,
};
use order_fulfillment::telemetry::{AnomalyDetector, TelemetryError, TelemetryIngestor};

fn reading(lat: f64, lng: f64, temperature: Option<f64>) -> TelemetryReading {
    TelemetryReading {
        lat,
        lng,
        temperature,
        status: None,
        notes: None,
        reported_at: None,
    }
}

async fn system_with_delivery() -> (FulfillmentSystem, DeliveryId) {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();
    let receipt = system
        .checkout
        .checkout(checkout_request(&[(1, 1)]))
        .await
        .unwrap();
    (system, receipt.delivery_id)
}

/// Cold-chain band is 2..=8 C.
#[tokio::test]
async fn test_temperature_excursion_alert() {
    let (system, delivery_id) = system_with_delivery().await;

    let warm = system
        .ingestor
        .ingest(delivery_id, reading(48.86, 2.34, Some(12.0)))
        .await
        .unwrap();
    assert!(warm.has_alert(AlertKind::TemperatureExcursion));
    assert_eq!(warm.temperature, Some(12.0));

    let cold_ok = system
        .ingestor
        .ingest(delivery_id, reading(48.86, 2.34, Some(5.0)))
        .await
        .unwrap();
    assert!(cold_ok.alerts.is_empty());

    // Both readings are in the ledger, alert or not.
    assert_eq!(system.tracking_client.history(delivery_id).await.unwrap().len(), 2);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_route_deviation_alert() {
    let (system, delivery_id) = system_with_delivery().await;

    let first = system
        .ingestor
        .ingest(delivery_id, reading(48.8566, 2.3522, None))
        .await
        .unwrap();
    // No previous reading, nothing to compare against.
    assert!(first.alerts.is_empty());

    let nearby = system
        .ingestor
        .ingest(delivery_id, reading(48.8600, 2.3600, None))
        .await
        .unwrap();
    assert!(!nearby.has_alert(AlertKind::RouteDeviation));

    // Paris to Lille in one hop
    let jump = system
        .ingestor
        .ingest(delivery_id, reading(50.6292, 3.0573, None))
        .await
        .unwrap();
    assert!(jump.has_alert(AlertKind::RouteDeviation));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_history_uses_server_time() {
    let (system, delivery_id) = system_with_delivery().await;

    let now = Utc::now();
    for (n, reported) in [now, now - Duration::hours(1), now - Duration::hours(2)]
        .into_iter()
        .enumerate()
    {
        let mut r = reading(48.86, 2.34, Some(4.0));
        r.notes = Some(format!("reading {n}"));
        r.reported_at = Some(reported);
        system.ingestor.ingest(delivery_id, r).await.unwrap();
    }

    let history = system.tracking_client.history(delivery_id).await.unwrap();
    let notes: Vec<_> = history.iter().filter_map(|e| e.notes.as_deref()).collect();
    assert_eq!(notes, ["reading 0", "reading 1", "reading 2"]);
    assert!(history
        .windows(2)
        .all(|pair| pair[0].recorded_at <= pair[1].recorded_at));

    let latest = system.tracking_client.latest(delivery_id).unwrap();
    assert_eq!(latest.notes.as_deref(), Some("reading 2"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reported_status_advances_delivery_and_order() {
    let (system, delivery_id) = system_with_delivery().await;
    let order_id = system.delivery_client.fetch(delivery_id).await.unwrap().order_id;

    let mut moving = reading(48.86, 2.34, Some(4.0));
    moving.status = Some(DeliveryStatus::InTransit);
    let update = system.ingestor.ingest(delivery_id, moving).await.unwrap();
    assert_eq!(update.status, DeliveryStatus::InTransit);

    let delivery = system.delivery_client.fetch(delivery_id).await.unwrap();
    assert_eq!(delivery.status, DeliveryStatus::InTransit);
    let order = system.order_client.fetch(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);

    let mut arrived = reading(48.8606, 2.3376, Some(4.0));
    arrived.status = Some(DeliveryStatus::Delivered);
    system.ingestor.ingest(delivery_id, arrived).await.unwrap();
    let order = system.order_client.fetch(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);

    // A backwards status is recorded but does not move the delivery.
    let mut backwards = reading(48.8606, 2.3376, None);
    backwards.status = Some(DeliveryStatus::InTransit);
    let update = system.ingestor.ingest(delivery_id, backwards).await.unwrap();
    assert_eq!(update.status, DeliveryStatus::Delivered);
    assert_eq!(
        system.delivery_client.fetch(delivery_id).await.unwrap().status,
        DeliveryStatus::Delivered
    );
    assert_eq!(system.tracking_client.history(delivery_id).await.unwrap().len(), 3);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rejected_readings() {
    let (system, delivery_id) = system_with_delivery().await;

    let unknown = DeliveryId(delivery_id.0 + 100);
    assert_eq!(
        system
            .ingestor
            .ingest(unknown, reading(48.86, 2.34, None))
            .await
            .unwrap_err(),
        TelemetryError::DeliveryNotFound(unknown)
    );

    for bad in [
        reading(95.0, 2.34, None),
        reading(48.86, 200.0, None),
        reading(f64::NAN, 2.34, None),
        reading(48.86, 2.34, Some(f64::INFINITY)),
    ] {
        let err = system.ingestor.ingest(delivery_id, bad).await.unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidReading(_)), "{err:?}");
    }
    assert!(system.tracking_client.history(delivery_id).await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

/// Subscribers of one delivery see its updates and nothing else.
#[tokio::test]
async fn test_live_subscribers_receive_updates() {
    let system = FulfillmentSystem::start(&test_config()).await.unwrap();
    let first = system.checkout.checkout(checkout_request(&[(2, 1)])).await.unwrap();
    let second = system.checkout.checkout(checkout_request(&[(2, 1)])).await.unwrap();

    let mut watcher = system.hub_client.subscribe(first.delivery_id).await.unwrap();
    let mut other = system.hub_client.subscribe(second.delivery_id).await.unwrap();

    system
        .ingestor
        .ingest(first.delivery_id, reading(48.86, 2.34, Some(12.0)))
        .await
        .unwrap();

    let update = tokio::time::timeout(std::time::Duration::from_secs(1), watcher.recv())
        .await
        .expect("update not delivered")
        .unwrap();
    assert_eq!(update.delivery_id, first.delivery_id);
    assert!(update.has_alert(AlertKind::TemperatureExcursion));

    // The hub handles requests in order, so the count reply means the fan-out is done.
    assert_eq!(
        system.hub_client.subscriber_count(second.delivery_id).await.unwrap(),
        1
    );
    assert!(other.try_recv().is_none());

    drop(watcher);
    drop(other);
    system.shutdown().await.unwrap();
}

/// Without a working hub, readings still land in the ledger.
#[tokio::test]
async fn test_ingestion_degrades_to_ledger_only() {
    let (system, delivery_id) = system_with_delivery().await;
    let ingestor_with = |hub_client| {
        TelemetryIngestor::new(
            system.tracking_client.clone(),
            system.delivery_client.clone(),
            system.order_client.clone(),
            hub_client,
            AnomalyDetector::from_config(&TelemetryConfig::default()),
        )
    };

    // Hub gone: its mailbox is closed.
    let (hub, hub_client) = BroadcastHub::new(4, 4);
    drop(hub);
    let ingestor = ingestor_with(hub_client);
    let update = ingestor
        .ingest(delivery_id, reading(48.86, 2.34, Some(12.0)))
        .await
        .unwrap();
    assert!(update.has_alert(AlertKind::TemperatureExcursion));
    drop(ingestor);

    // Hub alive but not draining: the second publish finds the mailbox full.
    let (stalled_hub, hub_client) = BroadcastHub::new(1, 4);
    let ingestor = ingestor_with(hub_client);
    for temperature in [4.0, 5.0] {
        ingestor
            .ingest(delivery_id, reading(48.86, 2.34, Some(temperature)))
            .await
            .unwrap();
    }
    drop(ingestor);
    drop(stalled_hub);

    let history = system.tracking_client.history(delivery_id).await.unwrap();
    let temperatures: Vec<_> = history.iter().filter_map(|e| e.temperature).collect();
    assert_eq!(temperatures, [12.0, 4.0, 5.0]);
    assert_eq!(
        system.tracking_client.latest(delivery_id).map(|e| e.temperature),
        Some(Some(5.0))
    );

    system.shutdown().await.unwrap();
}
