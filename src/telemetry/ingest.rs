use super::detector::{validate_reading, AnomalyDetector};
use super::error::TelemetryError;
use crate::clients::{DeliveryClient, HubClient, OrderClient, TrackingClient};
use crate::delivery_actor::DeliveryError;
use crate::model::{
    Delivery, DeliveryId, DeliveryStatus, OrderStatus, TelemetryReading, TrackingEntryCreate,
    TrackingUpdate,
};
use tracing::{debug, info, instrument, warn};

/// Turns readings into ledger rows, alerts, status changes and live updates.
#[derive(Clone)]
pub struct TelemetryIngestor {
    tracking: TrackingClient,
    deliveries: DeliveryClient,
    orders: OrderClient,
    hub: HubClient,
    detector: AnomalyDetector,
}

impl TelemetryIngestor {
    pub fn new(
        tracking: TrackingClient,
        deliveries: DeliveryClient,
        orders: OrderClient,
        hub: HubClient,
        detector: AnomalyDetector,
    ) -> Self {
        Self {
            tracking,
            deliveries,
            orders,
            hub,
            detector,
        }
    }

    /// Records one reading for `delivery_id` and returns the update sent to subscribers.
    ///
    /// The ledger write is the only hard requirement: a rejected status change, a failed
    /// order sync or an unavailable hub are logged and the reading is still accepted.
    #[instrument(skip(self, reading), fields(delivery_id = %delivery_id))]
    pub async fn ingest(
        &self,
        delivery_id: DeliveryId,
        reading: TelemetryReading,
    ) -> Result<TrackingUpdate, TelemetryError> {
        debug!(?reading, "ingest called");
        validate_reading(&reading)?;

        let delivery = self
            .deliveries
            .fetch(delivery_id)
            .await
            .map_err(|e| match e {
                DeliveryError::NotFound(_) => TelemetryError::DeliveryNotFound(delivery_id),
                other => TelemetryError::ActorCommunicationError(other.to_string()),
            })?;

        // Unlocked read-then-write: two racing readings may both compare against the same
        // previous row.
        let previous = self.tracking.latest(delivery_id);
        let entry = self
            .tracking
            .record(TrackingEntryCreate {
                delivery_id,
                reading: reading.clone(),
            })
            .await?;

        let alerts = self.detector.evaluate(previous.as_ref(), &reading);
        for alert in &alerts {
            warn!(kind = ?alert.kind, message = %alert.message, "Telemetry alert");
        }

        let status = match reading.status {
            Some(next) if next != delivery.status => self.advance(&delivery, next).await,
            _ => delivery.status,
        };

        let update = TrackingUpdate {
            delivery_id,
            lat: entry.lat,
            lng: entry.lng,
            temperature: entry.temperature,
            status,
            alerts,
            timestamp: entry.recorded_at,
        };

        if let Err(e) = self.hub.publish(update.clone()) {
            warn!(error = %e, "Live update not broadcast");
        }

        Ok(update)
    }

    /// Applies a reported status. Returns the status the delivery ends up with.
    async fn advance(&self, delivery: &Delivery, next: DeliveryStatus) -> DeliveryStatus {
        match self.deliveries.advance(delivery.id, next).await {
            Ok(change) => {
                if change.changed {
                    info!(from = %change.from, to = %change.to, "Delivery status advanced");
                    self.sync_order(delivery, next).await;
                }
                next
            }
            Err(e) => {
                warn!(error = %e, "Reported status rejected, keeping stored status");
                delivery.status
            }
        }
    }

    async fn sync_order(&self, delivery: &Delivery, status: DeliveryStatus) {
        let target = match status {
            DeliveryStatus::InTransit => OrderStatus::Shipped,
            DeliveryStatus::Delivered => OrderStatus::Delivered,
            _ => return,
        };
        if let Err(e) = self.orders.advance(delivery.order_id, target).await {
            warn!(order_id = %delivery.order_id, error = %e, "Order status not synced");
        }
    }
}
