//! # Broadcast Hub
//!
//! One hub per process, created by the lifecycle and handed to telemetry ingestion (which
//! publishes) and to the WebSocket accept path (which subscribes). Publishing never waits:
//! a full hub mailbox drops the update, a full subscriber buffer drops it for that
//! subscriber only. There is no replay for late subscribers.

pub mod error;
pub mod hub;

pub use error::HubError;
pub use hub::{BroadcastHub, HubRequest, Subscription};
