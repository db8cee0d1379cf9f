//! # Delivery Client
//!
//! High-level API for the `Delivery` actor.
use crate::delivery_actor::{DeliveryAction, DeliveryError};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{
    Delivery, DeliveryCreate, DeliveryId, DeliveryStatus, LogisticsSolution, OrderId, StatusChange,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct DeliveryClient {
    inner: ResourceClient<Delivery>,
}

impl DeliveryClient {
    pub fn new(inner: ResourceClient<Delivery>) -> Self {
        Self { inner }
    }

    /// Creates the delivery for `order_id` from a planned route set.
    #[instrument(skip(self, solution), fields(routes = solution.routes.len()))]
    pub async fn create_for_order(
        &self,
        order_id: OrderId,
        solution: LogisticsSolution,
    ) -> Result<DeliveryId, DeliveryError> {
        debug!("Sending request");
        self.inner
            .create(DeliveryCreate { order_id, solution })
            .await
            .map_err(|e| match e {
                FrameworkError::Conflict(_) => DeliveryError::AlreadyExists(order_id),
                other => Self::map_error(other),
            })
    }

    pub async fn fetch(&self, id: DeliveryId) -> Result<Delivery, DeliveryError> {
        self.get(id)
            .await?
            .ok_or_else(|| DeliveryError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        id: DeliveryId,
        status: DeliveryStatus,
    ) -> Result<StatusChange, DeliveryError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, DeliveryAction::Advance(status))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Delivery>, DeliveryError> {
        let mut found = self
            .inner
            .query(move |d: &Delivery| d.order_id == order_id)
            .await
            .map_err(Self::map_error)?;
        Ok(found.pop())
    }
}

#[async_trait]
impl ActorClient<Delivery> for DeliveryClient {
    type Error = DeliveryError;

    fn inner(&self) -> &ResourceClient<Delivery> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => DeliveryError::NotFound(id),
            other => other
                .downcast_entity::<DeliveryError>()
                .unwrap_or_else(|e| DeliveryError::ActorCommunicationError(e.to_string())),
        }
    }
}
