//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient) and the
//! broadcast hub mailbox.

pub mod delivery_client;
pub mod hub_client;
pub mod order_client;
pub mod tracking_client;
pub mod webhook_client;

pub use delivery_client::*;
pub use hub_client::*;
pub use order_client::*;
pub use tracking_client::*;
pub use webhook_client::*;
