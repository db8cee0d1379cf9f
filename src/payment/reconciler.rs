use super::error::PaymentError;
use super::gateway::{
    parse_paypal_notification, parse_stripe_event, verify_stripe_signature, GatewayEvent,
};
use crate::clients::WebhookClient;
use crate::lifecycle::config::PaymentsConfig;
use crate::model::{OrderId, PaymentStatus, WebhookRecordCreate};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// What happened to an accepted notification. Every variant is acknowledged to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ReconcileOutcome {
    Applied {
        order_id: OrderId,
        payment_status: PaymentStatus,
        /// False when the order was already past this status.
        changed: bool,
    },
    /// Event type that carries no payment state.
    Ignored { event_type: String },
    /// Seen before; nothing was applied.
    Duplicate { idempotency_key: String },
}

#[derive(Clone)]
pub struct PaymentReconciler {
    records: WebhookClient,
    stripe_secret: Option<String>,
    tolerance_secs: i64,
    retention: Duration,
}

impl PaymentReconciler {
    pub fn new(records: WebhookClient, config: &PaymentsConfig) -> Self {
        Self {
            records,
            stripe_secret: config.stripe_webhook_secret.clone(),
            tolerance_secs: config.signature_tolerance_secs,
            retention: Duration::hours(config.retention_hours),
        }
    }

    /// Verifies, parses and applies a Stripe event. Nothing is recorded unless the
    /// signature checks out.
    #[instrument(skip(self, body, signature), fields(bytes = body.len()))]
    pub async fn handle_stripe(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let secret = self.stripe_secret.as_deref().ok_or_else(|| {
            PaymentError::SignatureInvalid("no Stripe webhook secret configured".into())
        })?;
        let signature = signature
            .ok_or_else(|| PaymentError::SignatureInvalid("missing Stripe-Signature".into()))?;

        if let Err(e) = verify_stripe_signature(
            body,
            signature,
            secret,
            self.tolerance_secs,
            Utc::now().timestamp(),
        ) {
            warn!(error = %e, "Stripe webhook rejected");
            return Err(e);
        }

        let event = parse_stripe_event(body)?;
        self.reconcile(event).await
    }

    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn handle_paypal(&self, body: &[u8]) -> Result<ReconcileOutcome, PaymentError> {
        let event = parse_paypal_notification(body)?;
        self.reconcile(event).await
    }

    async fn reconcile(&self, event: GatewayEvent) -> Result<ReconcileOutcome, PaymentError> {
        let Some(payment_status) = event.payment_status else {
            info!(gateway = %event.gateway, event_type = %event.event_type, "Event ignored");
            return Ok(ReconcileOutcome::Ignored {
                event_type: event.event_type,
            });
        };
        let order_id = event.order_id()?;
        let key = event.idempotency_key.clone();

        let recorded = self
            .records
            .record(WebhookRecordCreate {
                gateway: event.gateway,
                event_id: event.event_id,
                idempotency_key: event.idempotency_key,
                order_id,
                payment_status,
                payload: event.payload,
            })
            .await?;

        let Some(id) = recorded else {
            info!(%key, "Duplicate webhook, skipping");
            return Ok(ReconcileOutcome::Duplicate {
                idempotency_key: key,
            });
        };

        let record = self.records.fetch(id).await?;
        Ok(ReconcileOutcome::Applied {
            order_id,
            payment_status,
            changed: record.applied,
        })
    }

    /// Removes records older than the retention window. Returns how many were removed.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize, PaymentError> {
        let removed = self.records.prune_before(now - self.retention).await?;
        if removed > 0 {
            info!(removed, "Expired webhook records pruned");
        }
        Ok(removed)
    }
}
