//! Gateway wire formats: Stripe-style signed events and PayPal IPN-style notifications.

use super::error::PaymentError;
use crate::model::{Gateway, OrderId, PaymentStatus};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;

/// Verifies a `Stripe-Signature: t=<unix>,v1=<hex>` header against the raw body.
///
/// The signed payload is `"{t}.{body}"`, MAC'd with HMAC-SHA256. The comparison is constant
/// time, and `t` must be within `tolerance_secs` of `now`.
pub fn verify_stripe_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err(PaymentError::SignatureInvalid(
            "invalid Stripe-Signature header".into(),
        ));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::SignatureInvalid("invalid timestamp".into()))?;
    if (now - ts).abs() > tolerance_secs {
        return Err(PaymentError::SignatureInvalid(
            "timestamp outside tolerance".into(),
        ));
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::SignatureInvalid("HMAC key error".into()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Stripe sends several v1 entries while a secret is being rolled.
    let matched = signatures.iter().any(|signature| {
        hex::decode(signature)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(PaymentError::SignatureInvalid("signature mismatch".into()));
    }
    Ok(())
}

/// Builds a header value for `payload`, as the gateway would send it.
pub fn sign_stripe_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={timestamp}"),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// A gateway notification reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub gateway: Gateway,
    pub event_id: String,
    pub event_type: String,
    pub idempotency_key: String,
    /// `None` for event types that do not touch payment state.
    pub payment_status: Option<PaymentStatus>,
    pub order_ref: Option<String>,
    pub payload: serde_json::Value,
}

impl GatewayEvent {
    /// Resolves the order reference (`"12"` or `"order_12"`).
    pub fn order_id(&self) -> Result<OrderId, PaymentError> {
        let raw = self
            .order_ref
            .as_deref()
            .ok_or_else(|| PaymentError::MalformedPayload("missing order reference".into()))?;
        raw.trim()
            .strip_prefix("order_")
            .unwrap_or(raw.trim())
            .parse::<u32>()
            .map(OrderId)
            .map_err(|_| PaymentError::MalformedPayload(format!("invalid order reference: {raw}")))
    }
}

pub fn stripe_payment_status(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "payment_intent.succeeded" | "charge.succeeded" | "checkout.session.completed" => {
            Some(PaymentStatus::Paid)
        }
        "payment_intent.payment_failed" | "charge.failed" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

pub fn paypal_payment_status(status: &str) -> Option<PaymentStatus> {
    match status {
        "Completed" => Some(PaymentStatus::Paid),
        "Denied" | "Failed" | "Expired" | "Voided" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Option<StripeEventData>,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: StripeObject,
}

#[derive(Debug, Deserialize)]
struct StripeObject {
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

pub fn parse_stripe_event(body: &[u8]) -> Result<GatewayEvent, PaymentError> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
    let event: StripeEvent = serde_json::from_value(payload.clone())
        .map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;

    let order_ref = event
        .data
        .and_then(|data| data.object.metadata.get("order_id").cloned())
        .and_then(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Ok(GatewayEvent {
        gateway: Gateway::Stripe,
        idempotency_key: format!("stripe:{}", event.id),
        payment_status: stripe_payment_status(&event.event_type),
        event_id: event.id,
        event_type: event.event_type,
        order_ref,
        payload,
    })
}

#[derive(Debug, Deserialize)]
struct PayPalNotification {
    txn_id: String,
    payment_status: String,
    #[serde(default)]
    invoice: Option<String>,
}

pub fn parse_paypal_notification(body: &[u8]) -> Result<GatewayEvent, PaymentError> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
    let ipn: PayPalNotification = serde_json::from_value(payload.clone())
        .map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;

    // One notification per (transaction, status).
    Ok(GatewayEvent {
        gateway: Gateway::PayPal,
        idempotency_key: format!("paypal:{}:{}", ipn.txn_id, ipn.payment_status),
        payment_status: paypal_payment_status(&ipn.payment_status),
        event_id: ipn.txn_id,
        event_type: ipn.payment_status,
        order_ref: ipn.invoice,
        payload,
    })
}
