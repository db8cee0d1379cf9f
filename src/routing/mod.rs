//! # Route Planner
//!
//! Pure shipping-route computation: for every order line, pick the hub that minimizes
//! `supplier → hub → destination`, merge candidates per supplier, price the result and
//! assign a carrier through a [`PartnerSelector`].
//!
//! Planning never touches stock or actors. Given the same lines, directory, destination
//! and `now`, it returns the same distances and costs.

pub mod error;
pub mod selector;

pub use error::*;
pub use selector::*;

use crate::lifecycle::config::{DirectoryConfig, PointConfig, RoutingConfig};
use crate::model::{
    DeliveryPartner, DeliveryPoint, GeoPoint, LogisticsSolution, OrderLine, PointKind, ProductId,
    Route,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// What to do with a line whose supplier cannot be resolved, or when no hub exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnroutablePolicy {
    /// Reject the whole checkout before any stock is reserved.
    #[default]
    FailClosed,
    /// Ship what can be routed and report the rest in `LogisticsSolution::unrouted`.
    FlagPartial,
}

/// Supplier and hub locations plus the product → supplier mapping.
#[derive(Debug, Clone, Default)]
pub struct PointDirectory {
    hubs: Vec<DeliveryPoint>,
    suppliers: HashMap<String, DeliveryPoint>,
    product_suppliers: HashMap<ProductId, String>,
}

fn point(config: &PointConfig, kind: PointKind) -> DeliveryPoint {
    DeliveryPoint {
        id: config.id.clone(),
        name: config.name.clone(),
        lat: config.lat,
        lng: config.lng,
        kind,
    }
}

impl PointDirectory {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self {
            hubs: config.hubs.iter().map(|h| point(h, PointKind::Hub)).collect(),
            suppliers: config
                .suppliers
                .iter()
                .map(|s| (s.id.clone(), point(s, PointKind::Supplier)))
                .collect(),
            product_suppliers: config
                .product_suppliers
                .iter()
                .map(|link| (ProductId(link.product_id), link.supplier_id.clone()))
                .collect(),
        }
    }

    pub fn supplier_for(&self, product_id: ProductId) -> Option<&DeliveryPoint> {
        self.product_suppliers
            .get(&product_id)
            .and_then(|supplier_id| self.suppliers.get(supplier_id))
    }

    /// Hub minimizing `d(supplier, hub) + d(hub, destination)`. The first minimum wins.
    fn best_hub(&self, supplier: GeoPoint, destination: GeoPoint) -> Option<(&DeliveryPoint, f64)> {
        let mut best: Option<(&DeliveryPoint, f64)> = None;
        for hub in &self.hubs {
            let distance =
                haversine_km(supplier, hub.location()) + haversine_km(hub.location(), destination);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((hub, distance));
            }
        }
        best
    }
}

pub struct RoutePlanner {
    settings: RoutingConfig,
    directory: PointDirectory,
    selector: Box<dyn PartnerSelector>,
}

impl RoutePlanner {
    pub fn new(
        settings: RoutingConfig,
        directory: PointDirectory,
        selector: Box<dyn PartnerSelector>,
    ) -> Result<Self, RoutingError> {
        if !(settings.average_speed_kmh > 0.0) {
            return Err(RoutingError::InvalidSettings(
                "average speed must be positive".into(),
            ));
        }
        if settings.delivery_sla_days < 0 {
            return Err(RoutingError::InvalidSettings(
                "delivery SLA must not be negative".into(),
            ));
        }
        Ok(Self {
            settings,
            directory,
            selector,
        })
    }

    /// Builds a planner from configuration, with the configured selector.
    pub fn from_config(
        settings: &RoutingConfig,
        directory: &DirectoryConfig,
    ) -> Result<Self, RoutingError> {
        Self::new(
            settings.clone(),
            PointDirectory::from_config(directory),
            settings.partner_selector.build(),
        )
    }

    pub fn partners(&self) -> &[DeliveryPartner] {
        &self.settings.partners
    }

    fn cost(&self, distance_km: f64) -> Decimal {
        let distance = Decimal::try_from(distance_km).unwrap_or_default();
        (self.settings.base_fee + distance * self.settings.per_km_rate).round_dp(2)
    }

    /// Plans the routes for `lines` shipped to `destination`.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn plan(
        &self,
        lines: &[OrderLine],
        destination: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<LogisticsSolution, RoutingError> {
        if !destination.is_valid() {
            return Err(RoutingError::InvalidDestination {
                lat: destination.lat,
                lng: destination.lng,
            });
        }

        let customer = DeliveryPoint {
            id: "destination".to_string(),
            name: "Customer".to_string(),
            lat: destination.lat,
            lng: destination.lng,
            kind: PointKind::Customer,
        };

        let mut routes: Vec<Route> = Vec::new();
        let mut unrouted: Vec<ProductId> = Vec::new();

        for line in lines {
            let candidate = self
                .directory
                .supplier_for(line.product_id)
                .and_then(|supplier| {
                    self.directory
                        .best_hub(supplier.location(), destination)
                        .map(|(hub, distance)| (supplier, hub, distance))
                });

            let Some((supplier, hub, distance)) = candidate else {
                warn!(product_id = %line.product_id, "No route for line");
                unrouted.push(line.product_id);
                continue;
            };
            let hours = distance / self.settings.average_speed_kmh;

            // One route per supplier, keeping the longest candidate.
            match routes.iter_mut().find(|r| r.supplier_id == supplier.id) {
                Some(existing) => {
                    if distance > existing.total_distance_km {
                        existing.points = vec![supplier.clone(), hub.clone(), customer.clone()];
                        existing.total_distance_km = distance;
                    }
                    existing.estimated_hours = existing.estimated_hours.max(hours);
                }
                None => routes.push(Route {
                    supplier_id: supplier.id.clone(),
                    points: vec![supplier.clone(), hub.clone(), customer.clone()],
                    total_distance_km: distance,
                    estimated_hours: hours,
                    cost: Decimal::ZERO,
                    assigned_partner: None,
                }),
            }
        }

        if !unrouted.is_empty() {
            match self.settings.unroutable_policy {
                UnroutablePolicy::FailClosed => return Err(RoutingError::Unroutable(unrouted)),
                UnroutablePolicy::FlagPartial if routes.is_empty() => {
                    return Err(RoutingError::NothingRoutable)
                }
                UnroutablePolicy::FlagPartial => {}
            }
        }

        for route in &mut routes {
            route.cost = self.cost(route.total_distance_km);
            route.assigned_partner = self
                .selector
                .select(route, &self.settings.partners)
                .map(|partner| partner.id);
        }
        let total_cost = routes.iter().map(|r| r.cost).sum();

        debug!(routes = routes.len(), %total_cost, "Routes planned");
        Ok(LogisticsSolution {
            routes,
            total_cost,
            estimated_delivery_date: now + Duration::days(self.settings.delivery_sla_days),
            unrouted,
        })
    }
}
