//! The hub actor: a registry of live subscribers keyed by delivery.

use crate::clients::HubClient;
use crate::model::{DeliveryId, TrackingUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub enum HubRequest {
    Subscribe {
        delivery_id: DeliveryId,
        respond_to: oneshot::Sender<Subscription>,
    },
    Publish(Arc<TrackingUpdate>),
    SubscriberCount {
        delivery_id: DeliveryId,
        respond_to: oneshot::Sender<usize>,
    },
}

/// Receiving end of one live connection.
///
/// Dropping it is the unsubscribe: the hub prunes the closed sink on its next pass.
#[derive(Debug)]
pub struct Subscription {
    delivery_id: DeliveryId,
    receiver: mpsc::Receiver<Arc<TrackingUpdate>>,
}

impl Subscription {
    pub fn delivery_id(&self) -> DeliveryId {
        self.delivery_id
    }

    /// Next update, or `None` once the hub has shut down.
    pub async fn recv(&mut self) -> Option<Arc<TrackingUpdate>> {
        self.receiver.recv().await
    }

    /// Buffered update, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<TrackingUpdate>> {
        self.receiver.try_recv().ok()
    }
}

type Sink = mpsc::Sender<Arc<TrackingUpdate>>;

pub struct BroadcastHub {
    receiver: mpsc::Receiver<HubRequest>,
    subscribers: HashMap<DeliveryId, Vec<Sink>>,
    subscriber_capacity: usize,
}

impl BroadcastHub {
    /// Creates the hub and its client. `hub_capacity` bounds the mailbox,
    /// `subscriber_capacity` bounds each subscriber's buffer.
    pub fn new(hub_capacity: usize, subscriber_capacity: usize) -> (Self, HubClient) {
        let (sender, receiver) = mpsc::channel(hub_capacity);
        let hub = Self {
            receiver,
            subscribers: HashMap::new(),
            subscriber_capacity,
        };
        (hub, HubClient::new(sender))
    }

    pub async fn run(mut self) {
        info!("Broadcast hub started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                HubRequest::Subscribe {
                    delivery_id,
                    respond_to,
                } => {
                    let (sink, receiver) = mpsc::channel(self.subscriber_capacity);
                    let sinks = self.subscribers.entry(delivery_id).or_default();
                    sinks.retain(|s| !s.is_closed());
                    sinks.push(sink);
                    debug!(%delivery_id, subscribers = sinks.len(), "Subscribed");
                    let _ = respond_to.send(Subscription {
                        delivery_id,
                        receiver,
                    });
                }
                HubRequest::Publish(update) => self.fan_out(update),
                HubRequest::SubscriberCount {
                    delivery_id,
                    respond_to,
                } => {
                    self.prune(delivery_id);
                    let count = self.subscribers.get(&delivery_id).map_or(0, Vec::len);
                    let _ = respond_to.send(count);
                }
            }
        }

        info!(deliveries = self.subscribers.len(), "Broadcast hub shutting down");
    }

    fn fan_out(&mut self, update: Arc<TrackingUpdate>) {
        let delivery_id = update.delivery_id;
        let Some(sinks) = self.subscribers.get_mut(&delivery_id) else {
            debug!(%delivery_id, "No subscribers");
            return;
        };

        sinks.retain(|sink| match sink.try_send(update.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%delivery_id, "Subscriber lagging, update dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        debug!(%delivery_id, subscribers = sinks.len(), "Fanned out");

        if sinks.is_empty() {
            self.subscribers.remove(&delivery_id);
        }
    }

    fn prune(&mut self, delivery_id: DeliveryId) {
        if let Some(sinks) = self.subscribers.get_mut(&delivery_id) {
            sinks.retain(|s| !s.is_closed());
            if sinks.is_empty() {
                self.subscribers.remove(&delivery_id);
            }
        }
    }
}
