//! [`ActorEntity`] implementation for [`TrackingEntry`].
//!
//! Ledger rows are append-only: no updates, no actions. The actor's sequential mailbox and
//! the [`ServerClock`](super::ServerClock) in its context together make ids and
//! `recorded_at` grow together.

use super::error::TelemetryError;
use super::ledger::LedgerContext;
use crate::framework::ActorEntity;
use crate::model::{TrackingEntry, TrackingEntryCreate, TrackingEntryId};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for TrackingEntry {
    type Id = TrackingEntryId;
    type Create = TrackingEntryCreate;
    type Update = Infallible;
    type Action = Infallible;
    type ActionResult = ();
    type Context = LedgerContext;
    type Error = TelemetryError;

    fn from_create_params(
        id: TrackingEntryId,
        params: TrackingEntryCreate,
    ) -> Result<Self, TelemetryError> {
        let reading = params.reading;
        Ok(TrackingEntry {
            id,
            delivery_id: params.delivery_id,
            lat: reading.lat,
            lng: reading.lng,
            temperature: reading.temperature,
            status: reading.status,
            notes: reading.notes,
            reported_at: reading.reported_at,
            // Replaced in on_create with the ledger clock.
            recorded_at: Utc::now(),
        })
    }

    async fn on_create(&mut self, ledger: &LedgerContext) -> Result<(), TelemetryError> {
        self.recorded_at = ledger.clock.now();
        ledger.latest.remember(self);
        Ok(())
    }

    async fn on_update(&mut self, update: Infallible, _: &LedgerContext) -> Result<(), TelemetryError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: Infallible,
        _: &LedgerContext,
    ) -> Result<(), TelemetryError> {
        match action {}
    }
}
