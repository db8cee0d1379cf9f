//! Error types for the Delivery actor.

use crate::model::{DeliveryStatus, OrderId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Delivery not found: {0}")]
    NotFound(String),

    /// Each order gets exactly one delivery.
    #[error("Delivery already exists for {0}")]
    AlreadyExists(OrderId),

    #[error("Invalid delivery transition from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
