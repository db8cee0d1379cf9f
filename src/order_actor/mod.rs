//! # Order Actor
//!
//! Inventory reservation and order creation.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Order`]
//! - [`actions`] - [`OrderAction`]: payment, status advance, cancellation
//! - [`validate`] - cart validation that runs before any lock is taken
//! - [`error`] - [`OrderError`]
//!
//! ## Flow
//!
//! ```rust,ignore
//! let create = order_actor::validate_checkout(&request)?;   // no locks yet
//! let order_id = order_client.create_order(create).await?;  // Order::on_create reserves stock
//! ```
//!
//! The order actor is started with the [`InventoryStore`](crate::inventory::InventoryStore)
//! as its context.

pub mod actions;
pub mod entity;
pub mod error;
pub mod validate;

pub use actions::*;
pub use error::*;
pub use validate::validate_checkout;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::Order;

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
