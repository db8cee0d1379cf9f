//! Custom actions for the Order actor.

use crate::model::{Order, OrderStatus, PaymentStatus};

/// Operations on an existing order beyond CRUD.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Records a gateway payment outcome. Stale outcomes (e.g. `failed` after `paid`)
    /// are accepted and ignored.
    ApplyPayment(PaymentStatus),
    /// Moves the fulfillment status forward.
    Advance(OrderStatus),
    /// Cancels the order and returns its units to stock.
    Cancel,
}

/// Snapshot after an action, with whether the action changed anything.
#[derive(Debug, Clone)]
pub struct OrderActionResult {
    pub order: Order,
    pub changed: bool,
}
