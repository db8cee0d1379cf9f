//! # Tracking Client
//!
//! Append and read access to the tracking ledger.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{DeliveryId, TrackingEntry, TrackingEntryCreate, TrackingEntryId};
use crate::telemetry::{LatestIndex, TelemetryError};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct TrackingClient {
    inner: ResourceClient<TrackingEntry>,
    latest: LatestIndex,
}

impl TrackingClient {
    /// `latest` must be the index the ledger actor was started with.
    pub fn new(inner: ResourceClient<TrackingEntry>, latest: LatestIndex) -> Self {
        Self { inner, latest }
    }

    /// Appends a row and returns it as stored, with its server timestamp.
    #[instrument(skip(self, params), fields(delivery_id = %params.delivery_id))]
    pub async fn record(&self, params: TrackingEntryCreate) -> Result<TrackingEntry, TelemetryError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        self.get(id)
            .await?
            .ok_or_else(|| TelemetryError::NotFound(id.to_string()))
    }

    /// All rows for a delivery, ordered by server time and then ledger position.
    #[instrument(skip(self))]
    pub async fn history(&self, delivery_id: DeliveryId) -> Result<Vec<TrackingEntry>, TelemetryError> {
        let mut entries = self
            .inner
            .query(move |e: &TrackingEntry| e.delivery_id == delivery_id)
            .await
            .map_err(Self::map_error)?;
        entries.sort_by_key(|e| (e.recorded_at, e.id));
        Ok(entries)
    }

    /// Newest row for a delivery, from the ledger's index. No ledger scan.
    pub fn latest(&self, delivery_id: DeliveryId) -> Option<TrackingEntry> {
        self.latest.get(delivery_id)
    }

    pub async fn fetch(&self, id: TrackingEntryId) -> Result<TrackingEntry, TelemetryError> {
        self.get(id)
            .await?
            .ok_or_else(|| TelemetryError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl ActorClient<TrackingEntry> for TrackingClient {
    type Error = TelemetryError;

    fn inner(&self) -> &ResourceClient<TrackingEntry> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => TelemetryError::NotFound(id),
            other => other
                .downcast_entity::<TelemetryError>()
                .unwrap_or_else(|e| TelemetryError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use chrono::{Duration, Utc};

    fn entry(id: u32, offset_ms: i64) -> TrackingEntry {
        TrackingEntry {
            id: TrackingEntryId(id),
            delivery_id: DeliveryId(1),
            lat: 0.0,
            lng: 0.0,
            temperature: None,
            status: None,
            notes: None,
            reported_at: None,
            recorded_at: Utc::now() + Duration::milliseconds(offset_ms),
        }
    }

    #[tokio::test]
    async fn test_history_sorted_by_server_time_then_id() {
        let mut mock = MockClient::<TrackingEntry>::new();
        let tie = entry(2, 0);
        let mut same_time = entry(1, 0);
        same_time.recorded_at = tie.recorded_at;
        mock.expect_query()
            .return_ok(vec![entry(3, 50), tie, same_time]);

        let client = TrackingClient::new(mock.client(), LatestIndex::new());
        let ids: Vec<u32> = client
            .history(DeliveryId(1))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_closed_ledger_is_reported() {
        let mut mock = MockClient::<TrackingEntry>::new();
        mock.expect_query().return_err(FrameworkError::ActorClosed);
        let client = TrackingClient::new(mock.client(), LatestIndex::new());
        assert!(matches!(
            client.history(DeliveryId(1)).await,
            Err(TelemetryError::ActorCommunicationError(_))
        ));
    }

    /// The anomaly baseline comes from the index: no request reaches the ledger.
    #[tokio::test]
    async fn test_latest_does_not_query_the_ledger() {
        let mock = MockClient::<TrackingEntry>::new();
        let latest = LatestIndex::new();
        latest.remember(&entry(7, 0));
        let client = TrackingClient::new(mock.client(), latest);

        assert_eq!(client.latest(DeliveryId(1)).map(|e| e.id), Some(TrackingEntryId(7)));
        assert_eq!(client.latest(DeliveryId(2)), None);
        mock.verify();
    }

    /// Real ledger actor: appends update the index as they are stored.
    #[tokio::test]
    async fn test_record_updates_latest() {
        use crate::model::TelemetryReading;
        use crate::telemetry::LedgerContext;

        let latest = LatestIndex::new();
        let (actor, inner) = crate::telemetry::new(16);
        let handle = tokio::spawn(actor.run(LedgerContext::new(latest.clone())));
        let client = TrackingClient::new(inner, latest);

        for (delivery, lat) in [(1, 10.0), (2, 20.0), (1, 11.0)] {
            client
                .record(TrackingEntryCreate {
                    delivery_id: DeliveryId(delivery),
                    reading: TelemetryReading {
                        lat,
                        lng: 0.0,
                        temperature: None,
                        status: None,
                        notes: None,
                        reported_at: None,
                    },
                })
                .await
                .unwrap();
        }

        let newest = client.latest(DeliveryId(1)).unwrap();
        assert_eq!(newest.lat, 11.0);
        assert_eq!(Some(newest), client.history(DeliveryId(1)).await.unwrap().pop());
        assert_eq!(client.latest(DeliveryId(2)).map(|e| e.lat), Some(20.0));

        drop(client);
        handle.await.unwrap();
    }
}
