use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Supplier,
    Hub,
    Customer,
}

/// A stop on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPoint {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub kind: PointKind,
}

impl DeliveryPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A carrier that can be put on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPartner {
    pub id: String,
    pub name: String,
    /// Longest route the partner accepts; `None` means unlimited.
    #[serde(default)]
    pub max_route_km: Option<f64>,
}

/// One consolidated supplier → hub → destination leg set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub supplier_id: String,
    pub points: Vec<DeliveryPoint>,
    pub total_distance_km: f64,
    pub estimated_hours: f64,
    pub cost: Decimal,
    pub assigned_partner: Option<String>,
}

/// Output of route planning for one checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsSolution {
    pub routes: Vec<Route>,
    pub total_cost: Decimal,
    pub estimated_delivery_date: DateTime<Utc>,
    /// Lines left without a route; only populated under the flag-partial policy.
    #[serde(default)]
    pub unrouted: Vec<ProductId>,
}
