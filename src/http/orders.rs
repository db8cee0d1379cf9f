//! Checkout and order endpoints.

use super::AppState;
use crate::checkout::CheckoutReceipt;
use crate::error::FulfillmentError;
use crate::model::{CheckoutRequest, Order, OrderId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), FulfillmentError> {
    let receipt = state.checkout.checkout(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Order>, FulfillmentError> {
    Ok(Json(state.orders.fetch(OrderId(id)).await?))
}

/// POST /orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Order>, FulfillmentError> {
    let result = state.orders.cancel(OrderId(id)).await?;
    Ok(Json(result.order))
}
