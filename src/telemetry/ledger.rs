//! Context of the tracking ledger actor.

use super::clock::ServerClock;
use crate::model::{DeliveryId, TrackingEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Newest ledger row per delivery.
///
/// Written only by the ledger actor, in `on_create`, so it moves in the same order as the
/// ledger itself. Readers get the anomaly baseline without scanning the ledger.
#[derive(Debug, Clone, Default)]
pub struct LatestIndex {
    entries: Arc<Mutex<HashMap<DeliveryId, TrackingEntry>>>,
}

impl LatestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, delivery_id: DeliveryId) -> Option<TrackingEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&delivery_id)
            .cloned()
    }

    pub(crate) fn remember(&self, entry: &TrackingEntry) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let newer = entries
            .get(&entry.delivery_id)
            .map_or(true, |current| (entry.recorded_at, entry.id) >= (current.recorded_at, current.id));
        if newer {
            entries.insert(entry.delivery_id, entry.clone());
        }
    }
}

/// Clock and latest-row index handed to the ledger actor at startup.
#[derive(Debug, Default)]
pub struct LedgerContext {
    pub clock: ServerClock,
    pub latest: LatestIndex,
}

impl LedgerContext {
    pub fn new(latest: LatestIndex) -> Self {
        Self {
            clock: ServerClock::new(),
            latest,
        }
    }
}
