//! # Webhook Record Client
//!
//! High-level API for the idempotency-record actor.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{WebhookRecord, WebhookRecordCreate, WebhookRecordId};
use crate::payment::PaymentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct WebhookClient {
    inner: ResourceClient<WebhookRecord>,
}

impl WebhookClient {
    pub fn new(inner: ResourceClient<WebhookRecord>) -> Self {
        Self { inner }
    }

    /// Records the event and applies it to its order.
    ///
    /// Returns `None` when the idempotency key is already recorded.
    #[instrument(skip(self, params), fields(key = %params.idempotency_key))]
    pub async fn record(
        &self,
        params: WebhookRecordCreate,
    ) -> Result<Option<WebhookRecordId>, PaymentError> {
        debug!("Sending request");
        match self.inner.create(params).await {
            Ok(id) => Ok(Some(id)),
            Err(FrameworkError::Conflict(_)) => Ok(None),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    pub async fn fetch(&self, id: WebhookRecordId) -> Result<WebhookRecord, PaymentError> {
        self.get(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(id.to_string()))
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<WebhookRecord>, PaymentError> {
        let key = key.to_string();
        let mut found = self
            .inner
            .query(move |r: &WebhookRecord| r.idempotency_key == key)
            .await
            .map_err(Self::map_error)?;
        Ok(found.pop())
    }

    /// Deletes records processed before `cutoff`.
    #[instrument(skip(self))]
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize, PaymentError> {
        self.inner
            .purge(move |r: &WebhookRecord| r.processed_at < cutoff)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<WebhookRecord> for WebhookClient {
    type Error = PaymentError;

    fn inner(&self) -> &ResourceClient<WebhookRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => PaymentError::NotFound(id),
            other => other
                .downcast_entity::<PaymentError>()
                .unwrap_or_else(|e| PaymentError::ActorCommunicationError(e.to_string())),
        }
    }
}
