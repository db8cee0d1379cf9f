//! Error types for the payment reconciler.

use crate::order_actor::OrderError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    /// Bad or missing signature, stale timestamp, or no secret configured.
    #[error("Webhook signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    /// Applying the event to its order failed; no record was kept, so a retry is safe.
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Webhook record not found: {0}")]
    NotFound(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
