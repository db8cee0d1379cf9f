//! # Telemetry Ingestion & Anomaly Detection
//!
//! Readings arrive per delivery (HTTP or WebSocket) and go through [`TelemetryIngestor`]:
//!
//! 1. validate, look up the delivery
//! 2. read the latest ledger row, append the new one (`recorded_at` from [`ServerClock`])
//! 3. evaluate [`AnomalyDetector`] rules
//! 4. advance the delivery (and its order) when the reading carries a new status
//! 5. publish a [`TrackingUpdate`](crate::model::TrackingUpdate) to the broadcast hub
//!
//! The ledger itself is a `ResourceActor<TrackingEntry>`. Its [`LedgerContext`] carries the
//! clock and a [`LatestIndex`] of the newest row per delivery, which the ingestor reads
//! instead of querying the whole ledger.

pub mod clock;
pub mod detector;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod ledger;

pub use clock::ServerClock;
pub use detector::{validate_reading, AnomalyDetector};
pub use error::*;
pub use ingest::TelemetryIngestor;
pub use ledger::{LatestIndex, LedgerContext};

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::TrackingEntry;

/// Creates a new tracking ledger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<TrackingEntry>, ResourceClient<TrackingEntry>) {
    ResourceActor::new(buffer_size)
}
