use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LogisticsSolution, OrderId, Route};

entity_id!(
    /// Type-safe identifier for Deliveries.
    DeliveryId,
    "delivery"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    InTransit,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    fn rank(self) -> u8 {
        match self {
            DeliveryStatus::Pending => 0,
            DeliveryStatus::InTransit => 1,
            DeliveryStatus::Delivered | DeliveryStatus::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }

    /// Forward moves are allowed. `Failed` is forced from any state; nothing leaves it.
    pub fn can_move_to(self, next: DeliveryStatus) -> bool {
        if self == next || next == DeliveryStatus::Failed {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The trackable shipment for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub order_id: OrderId,
    pub status: DeliveryStatus,
    pub assigned_partner: Option<String>,
    pub estimated_delivery_date: DateTime<Utc>,
    pub tracking_number: String,
    pub routes: Vec<Route>,
    pub shipping_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DeliveryCreate {
    pub order_id: OrderId,
    pub solution: LogisticsSolution,
}

/// Result of a status advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
    pub changed: bool,
}
