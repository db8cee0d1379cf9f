//! # Hub Client
//!
//! Sending half of the [`BroadcastHub`](crate::broadcast::BroadcastHub).
use crate::broadcast::{HubError, HubRequest, Subscription};
use crate::model::{DeliveryId, TrackingUpdate};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Clone)]
pub struct HubClient {
    sender: mpsc::Sender<HubRequest>,
}

impl HubClient {
    pub fn new(sender: mpsc::Sender<HubRequest>) -> Self {
        Self { sender }
    }

    pub async fn subscribe(&self, delivery_id: DeliveryId) -> Result<Subscription, HubError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(HubRequest::Subscribe {
                delivery_id,
                respond_to,
            })
            .await
            .map_err(|_| HubError::Unavailable)?;
        response.await.map_err(|_| HubError::Unavailable)
    }

    /// Hands the update to the hub without waiting.
    pub fn publish(&self, update: TrackingUpdate) -> Result<(), HubError> {
        self.sender
            .try_send(HubRequest::Publish(Arc::new(update)))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => HubError::Saturated,
                mpsc::error::TrySendError::Closed(_) => HubError::Unavailable,
            })
    }

    /// Live subscribers for a delivery, after pruning disconnected ones.
    pub async fn subscriber_count(&self, delivery_id: DeliveryId) -> Result<usize, HubError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(HubRequest::SubscriberCount {
                delivery_id,
                respond_to,
            })
            .await
            .map_err(|_| HubError::Unavailable)?;
        response.await.map_err(|_| HubError::Unavailable)
    }
}
