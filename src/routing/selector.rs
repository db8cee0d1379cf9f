//! Carrier selection strategies.
//!
//! Which partner gets a route is business policy, not correctness, so the planner only
//! depends on the [`PartnerSelector`] trait.

use crate::model::{DeliveryPartner, Route};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks a carrier for a planned route.
///
/// Returns `None` when no partner can take the route; the route then ships unassigned.
pub trait PartnerSelector: Send + Sync {
    fn select(&self, route: &Route, partners: &[DeliveryPartner]) -> Option<DeliveryPartner>;
}

fn covers(partner: &DeliveryPartner, route: &Route) -> bool {
    partner
        .max_route_km
        .map_or(true, |max| route.total_distance_km <= max)
}

/// First partner, in configured order, whose range covers the route.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitSelector;

impl PartnerSelector for FirstFitSelector {
    fn select(&self, route: &Route, partners: &[DeliveryPartner]) -> Option<DeliveryPartner> {
        partners.iter().find(|p| covers(p, route)).cloned()
    }
}

/// Rotates through the partners that cover the route.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    cursor: AtomicUsize,
}

impl PartnerSelector for RoundRobinSelector {
    fn select(&self, route: &Route, partners: &[DeliveryPartner]) -> Option<DeliveryPartner> {
        let eligible: Vec<&DeliveryPartner> = partners.iter().filter(|p| covers(p, route)).collect();
        if eligible.is_empty() {
            return None;
        }
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        Some(eligible[turn % eligible.len()].clone())
    }
}

/// Configured selector choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    #[default]
    FirstFit,
    RoundRobin,
}

impl SelectorKind {
    pub fn build(self) -> Box<dyn PartnerSelector> {
        match self {
            SelectorKind::FirstFit => Box::new(FirstFitSelector),
            SelectorKind::RoundRobin => Box::new(RoundRobinSelector::default()),
        }
    }
}
