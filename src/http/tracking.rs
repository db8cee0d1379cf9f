//! Delivery snapshots, tracking history, reading ingestion and the live WebSocket.

use super::AppState;
use crate::broadcast::Subscription;
use crate::error::FulfillmentError;
use crate::model::{Delivery, DeliveryId, TelemetryReading, TrackingEntry, TrackingUpdate};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use futures::{SinkExt, StreamExt};

/// GET /deliveries/{id}
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Delivery>, FulfillmentError> {
    Ok(Json(state.deliveries.fetch(DeliveryId(id)).await?))
}

/// GET /deliveries/{id}/tracking
pub async fn tracking_history(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Vec<TrackingEntry>>, FulfillmentError> {
    let delivery = state.deliveries.fetch(DeliveryId(id)).await?;
    Ok(Json(state.tracking.history(delivery.id).await?))
}

/// POST /deliveries/{id}/tracking
pub async fn post_reading(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(reading): Json<TelemetryReading>,
) -> Result<Json<TrackingUpdate>, FulfillmentError> {
    Ok(Json(state.ingestor.ingest(DeliveryId(id), reading).await?))
}

/// GET /deliveries/{id}/live
///
/// Subscribes before the upgrade so an unknown delivery or a dead hub is a plain HTTP error.
pub async fn live(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, FulfillmentError> {
    let delivery = state.deliveries.fetch(DeliveryId(id)).await?;
    let subscription = state.hub.subscribe(delivery.id).await?;
    Ok(ws.on_upgrade(move |socket| handle_live_connection(socket, state, subscription)))
}

fn error_frame(e: &FulfillmentError) -> String {
    serde_json::json!({
        "type": "error",
        "code": e.code(),
        "message": e.to_string(),
    })
    .to_string()
}

async fn handle_live_connection(socket: WebSocket, state: AppState, mut subscription: Subscription) {
    let delivery_id = subscription.delivery_id();
    tracing::info!(%delivery_id, "Live tracking connected");

    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            update = subscription.recv() => {
                let Some(update) = update else {
                    tracing::info!(%delivery_id, "Hub closed, ending live session");
                    break;
                };
                match serde_json::to_string(update.as_ref()) {
                    Ok(json) => {
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(%delivery_id, "Failed to encode update: {e}"),
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let result = match serde_json::from_str::<TelemetryReading>(text.as_str()) {
                            Ok(reading) => state
                                .ingestor
                                .ingest(delivery_id, reading)
                                .await
                                .map(|_| ())
                                .map_err(FulfillmentError::from),
                            Err(e) => Err(FulfillmentError::Validation(e.to_string())),
                        };
                        // Accepted readings come back through the subscription.
                        if let Err(e) = result {
                            if ws_sink.send(Message::Text(error_frame(&e).into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(%delivery_id, "Live tracking disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(%delivery_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
