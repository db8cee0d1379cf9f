//! # Error Taxonomy
//!
//! Each component keeps its own error enum; at the service boundary they fold into
//! [`FulfillmentError`], which is what the HTTP layer turns into status codes.

use crate::broadcast::HubError;
use crate::delivery_actor::DeliveryError;
use crate::inventory::InventoryError;
use crate::model::ProductId;
use crate::order_actor::OrderError;
use crate::payment::PaymentError;
use crate::routing::RoutingError;
use crate::telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FulfillmentError {
    /// Malformed cart, reading or webhook payload. Not worth retrying.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A row lock wait timed out. The whole call can be retried.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// A component's mailbox is gone.
    #[error("Service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("Webhook signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

impl FulfillmentError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            FulfillmentError::Validation(_) => "validation_error",
            FulfillmentError::InsufficientStock { .. } => "insufficient_stock",
            FulfillmentError::ConcurrencyConflict(_) => "concurrency_conflict",
            FulfillmentError::ExternalServiceUnavailable(_) => "service_unavailable",
            FulfillmentError::SignatureInvalid(_) => "signature_invalid",
            FulfillmentError::NotFound(_) => "not_found",
            FulfillmentError::InvalidTransition(_) => "invalid_transition",
            FulfillmentError::Conflict(_) => "conflict",
            FulfillmentError::Routing(_) => "unroutable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FulfillmentError::ConcurrencyConflict(_) | FulfillmentError::ExternalServiceUnavailable(_)
        )
    }
}

impl From<InventoryError> for FulfillmentError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::InsufficientStock {
                product_id,
                requested,
                available,
            } => FulfillmentError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            InventoryError::UnknownProduct(_) => FulfillmentError::Validation(e.to_string()),
            InventoryError::AlreadyRegistered(_) => FulfillmentError::Conflict(e.to_string()),
            InventoryError::LockTimeout(_) | InventoryError::NotLocked(_) => {
                FulfillmentError::ConcurrencyConflict(e.to_string())
            }
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => FulfillmentError::NotFound(id),
            OrderError::ValidationError(msg) => FulfillmentError::Validation(msg),
            OrderError::Inventory(inner) => inner.into(),
            OrderError::InvalidTransition { .. } => {
                FulfillmentError::InvalidTransition(e.to_string())
            }
            OrderError::ActorCommunicationError(msg) => {
                FulfillmentError::ExternalServiceUnavailable(msg)
            }
        }
    }
}

impl From<DeliveryError> for FulfillmentError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::NotFound(id) => FulfillmentError::NotFound(id),
            DeliveryError::AlreadyExists(_) => FulfillmentError::Conflict(e.to_string()),
            DeliveryError::InvalidTransition { .. } => {
                FulfillmentError::InvalidTransition(e.to_string())
            }
            DeliveryError::ActorCommunicationError(msg) => {
                FulfillmentError::ExternalServiceUnavailable(msg)
            }
        }
    }
}

impl From<TelemetryError> for FulfillmentError {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::InvalidReading(msg) => FulfillmentError::Validation(msg),
            TelemetryError::DeliveryNotFound(id) => FulfillmentError::NotFound(id.to_string()),
            TelemetryError::NotFound(id) => FulfillmentError::NotFound(id),
            TelemetryError::ActorCommunicationError(msg) => {
                FulfillmentError::ExternalServiceUnavailable(msg)
            }
        }
    }
}

impl From<PaymentError> for FulfillmentError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::SignatureInvalid(msg) => FulfillmentError::SignatureInvalid(msg),
            PaymentError::MalformedPayload(msg) => FulfillmentError::Validation(msg),
            PaymentError::Order(inner) => inner.into(),
            PaymentError::NotFound(id) => FulfillmentError::NotFound(id),
            PaymentError::ActorCommunicationError(msg) => {
                FulfillmentError::ExternalServiceUnavailable(msg)
            }
        }
    }
}

impl From<HubError> for FulfillmentError {
    fn from(e: HubError) -> Self {
        FulfillmentError::ExternalServiceUnavailable(e.to_string())
    }
}
