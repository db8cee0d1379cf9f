use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, PaymentStatus};

entity_id!(
    /// Type-safe identifier for stored webhook idempotency records.
    WebhookRecordId,
    "webhook"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gateway {
    Stripe,
    #[serde(rename = "paypal")]
    PayPal,
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gateway::Stripe => f.write_str("stripe"),
            Gateway::PayPal => f.write_str("paypal"),
        }
    }
}

/// Proof that one gateway event was applied to its order exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    pub id: WebhookRecordId,
    pub gateway: Gateway,
    pub event_id: String,
    pub idempotency_key: String,
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    /// Whether applying the event actually changed the order.
    pub applied: bool,
    pub payload: serde_json::Value,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WebhookRecordCreate {
    pub gateway: Gateway,
    pub event_id: String,
    pub idempotency_key: String,
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    pub payload: serde_json::Value,
}
