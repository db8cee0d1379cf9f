//! Payment gateway webhooks. Bodies are taken raw so the signature covers the exact bytes.

use super::AppState;
use crate::error::FulfillmentError;
use crate::payment::ReconcileOutcome;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

/// POST /webhooks/stripe
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReconcileOutcome>, FulfillmentError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let outcome = state.reconciler.handle_stripe(&body, signature).await?;
    Ok(Json(outcome))
}

/// POST /webhooks/paypal
pub async fn paypal(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReconcileOutcome>, FulfillmentError> {
    Ok(Json(state.reconciler.handle_paypal(&body).await?))
}
