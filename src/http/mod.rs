//! # HTTP Boundary
//!
//! axum router over the fulfillment services. Handlers only translate between JSON and the
//! typed clients; every failure is a [`FulfillmentError`](crate::error::FulfillmentError)
//! rendered as `{code, message, productId?}`.

pub mod error;
pub mod orders;
pub mod tracking;
pub mod webhooks;

use crate::checkout::CheckoutService;
use crate::clients::{DeliveryClient, HubClient, OrderClient, TrackingClient};
use crate::payment::PaymentReconciler;
use crate::telemetry::TelemetryIngestor;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Shared handler state. Every field is a cheap clone over a mailbox sender.
#[derive(Clone)]
pub struct AppState {
    pub checkout: CheckoutService,
    pub orders: OrderClient,
    pub deliveries: DeliveryClient,
    pub tracking: TrackingClient,
    pub ingestor: TelemetryIngestor,
    pub hub: HubClient,
    pub reconciler: PaymentReconciler,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/orders", post(orders::create_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/deliveries/{id}", get(tracking::get_delivery))
        .route(
            "/deliveries/{id}/tracking",
            get(tracking::tracking_history).post(tracking::post_reading),
        )
        .route("/deliveries/{id}/live", get(tracking::live))
        .route("/webhooks/stripe", post(webhooks::stripe))
        .route("/webhooks/paypal", post(webhooks::paypal))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "order-fulfillment",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
