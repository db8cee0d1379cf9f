/// Customer orders and the checkout payload that creates them.
///
/// [`Order`] is managed by a [`ResourceActor`](crate::framework::ResourceActor); see
/// `order_actor::entity` for its lifecycle hooks and actions.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{GeoPoint, ProductId};

entity_id!(
    /// Type-safe identifier for Orders.
    OrderId,
    "order"
);

/// Fulfillment status. Moves forward only, except for explicit cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Position on the forward path. `Cancelled` sits outside it.
    pub fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Paid => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Paid | OrderStatus::Processing
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Allowed moves: unpaid to paid or failed, failed to paid (a retried payment).
    pub fn can_move_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Unpaid, PaymentStatus::Paid)
                | (PaymentStatus::Unpaid, PaymentStatus::Failed)
                | (PaymentStatus::Failed, PaymentStatus::Paid)
        )
    }
}

/// Where the order ships to. `lat`/`lng` are the routing destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub recipient: Option<String>,
    pub line1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

impl ShippingAddress {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A cart line as submitted at checkout.
///
/// `quantity` is signed so that zero and negative values reach validation instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_at_purchase: Decimal,
}

/// Checkout request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub shipping_price: Decimal,
}

/// A validated, coalesced order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

/// Payload for creating a new order. Built by `order_actor::validate_checkout`.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer: Option<String>,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub shipping_price: Decimal,
}

impl OrderCreate {
    /// Sum of the line totals, or `None` if it does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.lines.iter().try_fold(Decimal::ZERO, |sum, l| {
            l.price_at_purchase
                .checked_mul(Decimal::from(l.quantity))
                .and_then(|line_total| sum.checked_add(line_total))
        })
    }

    pub fn total(&self) -> Option<Decimal> {
        self.subtotal()?.checked_add(self.shipping_price)
    }
}

/// Price snapshot of one product within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_price: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending, unpaid order. Totals are computed here once and never again.
    ///
    /// Returns `None` when the totals overflow.
    pub fn new(id: OrderId, params: OrderCreate) -> Option<Self> {
        let now = Utc::now();
        let subtotal = params.subtotal()?;
        let total = params.total()?;
        let items = params
            .lines
            .into_iter()
            .map(|line| OrderItem {
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
                price_at_purchase: line.price_at_purchase,
            })
            .collect();

        Some(Self {
            id,
            customer: params.customer,
            items,
            subtotal,
            shipping_price: params.shipping_price,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            shipping_address: params.shipping_address,
            created_at: now,
            updated_at: now,
        })
    }
}
