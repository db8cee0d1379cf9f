//! # Payment Reconciler
//!
//! Gateway webhooks update `Order.payment_status` exactly once per event.
//!
//! ```text
//! verify signature ─► parse ─► WebhookRecord create ─┬─ key taken ─► Duplicate
//!                                                    └─ on_create: OrderClient::apply_payment
//! ```
//!
//! The records actor runs with the [`OrderClient`](crate::clients::OrderClient) as its
//! context and processes creates one at a time, so the key check and the order update
//! cannot interleave with a concurrent delivery of the same event.

pub mod entity;
pub mod error;
pub mod gateway;
pub mod reconciler;

pub use error::*;
pub use gateway::{sign_stripe_payload, verify_stripe_signature, GatewayEvent};
pub use reconciler::{PaymentReconciler, ReconcileOutcome};

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::WebhookRecord;

/// Creates a new webhook record actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<WebhookRecord>, ResourceClient<WebhookRecord>) {
    ResourceActor::new(buffer_size)
}
