//! Custom actions for the Delivery actor.

use crate::model::DeliveryStatus;

#[derive(Debug, Clone, Copy)]
pub enum DeliveryAction {
    /// Moves the status along `pending → in_transit → delivered`, or forces `failed`.
    /// Returns a [`StatusChange`](crate::model::StatusChange).
    Advance(DeliveryStatus),
}
