//! Error types for telemetry ingestion.

use crate::model::DeliveryId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TelemetryError {
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    #[error("Delivery not found: {0}")]
    DeliveryNotFound(DeliveryId),

    #[error("Tracking entry not found: {0}")]
    NotFound(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
