//! # Delivery Actor
//!
//! One [`Delivery`] per order, created right after the order commits. The order id is the
//! entity's unique key, so a second create for the same order is refused by the actor
//! itself. Status changes go through [`DeliveryAction::Advance`].

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::Delivery;

/// Creates a new Delivery actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Delivery>, ResourceClient<Delivery>) {
    ResourceActor::new(buffer_size)
}
