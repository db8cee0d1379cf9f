use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderId;

entity_id!(
    /// Type-safe identifier for catalog products.
    ProductId,
    "product"
);

/// Current stock fields of one product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: ProductId,
    pub name: String,
    pub stock_quantity: u32,
    pub in_stock: bool,
}

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Opening balance written when the product is registered.
    Initial,
    /// Units reserved by an order (negative delta).
    Sale,
    /// Units released by a cancelled order (positive delta).
    Return,
}

/// One append-only row of the stock ledger.
///
/// For every product the sum of `delta` over its movements equals its `stock_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: u64,
    pub product_id: ProductId,
    pub order_id: Option<OrderId>,
    pub delta: i64,
    pub kind: MovementKind,
    pub recorded_at: DateTime<Utc>,
}

/// A product whose stock row disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerDrift {
    pub product_id: ProductId,
    pub stock_quantity: u32,
    pub ledger_sum: i64,
}
