//! # Order Client
//!
//! High-level API for the `Order` actor. Entity errors raised inside the actor come back
//! as typed [`OrderError`]s, so callers can tell `InsufficientStock` from a dead actor.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, PaymentStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
///
/// Stock reservation happens in the Order actor's `on_create` hook.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(lines = params.lines.len()))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing order is an error.
    pub async fn fetch(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn apply_payment(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<OrderActionResult, OrderError> {
        self.act(id, OrderAction::ApplyPayment(status)).await
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderActionResult, OrderError> {
        self.act(id, OrderAction::Advance(status)).await
    }

    /// Cancels the order and returns its units to stock.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<OrderActionResult, OrderError> {
        self.act(id, OrderAction::Cancel).await
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => other
                .downcast_entity::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}
