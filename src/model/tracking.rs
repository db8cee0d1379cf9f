use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeliveryId, DeliveryStatus, GeoPoint};

entity_id!(
    /// Ledger position of a tracking entry. Breaks ties between equal server timestamps.
    TrackingEntryId,
    "tracking"
);

/// One inbound telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Device clock. Stored for reference, never used for ordering.
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

impl TelemetryReading {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Append-only ledger row (delivery tracking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub id: TrackingEntryId,
    pub delivery_id: DeliveryId,
    pub lat: f64,
    pub lng: f64,
    pub temperature: Option<f64>,
    pub status: Option<DeliveryStatus>,
    pub notes: Option<String>,
    pub reported_at: Option<DateTime<Utc>>,
    /// Server-assigned, non-decreasing across the ledger.
    pub recorded_at: DateTime<Utc>,
}

impl TrackingEntry {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone)]
pub struct TrackingEntryCreate {
    pub delivery_id: DeliveryId,
    pub reading: TelemetryReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    RouteDeviation,
    TemperatureExcursion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Message fanned out to live subscribers of a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tracking_update", rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub delivery_id: DeliveryId,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub status: DeliveryStatus,
    pub alerts: Vec<Alert>,
    pub timestamp: DateTime<Utc>,
}

impl TrackingUpdate {
    pub fn has_alert(&self, kind: AlertKind) -> bool {
        self.alerts.iter().any(|a| a.kind == kind)
    }
}
