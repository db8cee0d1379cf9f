//! Startup, wiring and shutdown of the fulfillment system, plus its configuration and
//! tracing setup.

pub mod config;
pub mod fulfillment_system;
pub mod tracing;

pub use config::FulfillmentConfig;
pub use fulfillment_system::FulfillmentSystem;
pub use self::tracing::setup_tracing;
