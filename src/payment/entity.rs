//! [`ActorEntity`] implementation for [`WebhookRecord`].
//!
//! The record *is* the idempotency check: its key is unique in the actor, and `on_create`
//! applies the payment to the order before the record is stored. A failed apply stores
//! nothing, so the gateway's retry gets a fresh attempt.

use super::error::PaymentError;
use crate::clients::OrderClient;
use crate::framework::ActorEntity;
use crate::model::{WebhookRecord, WebhookRecordCreate, WebhookRecordId};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;
use tracing::info;

#[async_trait]
impl ActorEntity for WebhookRecord {
    type Id = WebhookRecordId;
    type Create = WebhookRecordCreate;
    type Update = Infallible;
    type Action = Infallible;
    type ActionResult = ();
    type Context = OrderClient;
    type Error = PaymentError;

    fn from_create_params(
        id: WebhookRecordId,
        params: WebhookRecordCreate,
    ) -> Result<Self, PaymentError> {
        Ok(WebhookRecord {
            id,
            gateway: params.gateway,
            event_id: params.event_id,
            idempotency_key: params.idempotency_key,
            order_id: params.order_id,
            payment_status: params.payment_status,
            applied: false,
            payload: params.payload,
            processed_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.idempotency_key.clone())
    }

    async fn on_create(&mut self, orders: &OrderClient) -> Result<(), PaymentError> {
        let result = orders
            .apply_payment(self.order_id, self.payment_status)
            .await?;
        self.applied = result.changed;
        info!(
            order_id = %self.order_id,
            gateway = %self.gateway,
            payment_status = ?result.order.payment_status,
            changed = result.changed,
            "Payment applied"
        );
        Ok(())
    }

    async fn on_update(&mut self, update: Infallible, _: &OrderClient) -> Result<(), PaymentError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: Infallible,
        _: &OrderClient,
    ) -> Result<(), PaymentError> {
        match action {}
    }
}
