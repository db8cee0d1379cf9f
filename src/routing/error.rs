//! Error types for route planning.

use crate::model::ProductId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    /// Some lines have no supplier point or no hub is available (fail-closed policy).
    #[error("No route for products: {0:?}")]
    Unroutable(Vec<ProductId>),

    /// Not a single line could be routed (flag-partial policy).
    #[error("No line of the order can be routed")]
    NothingRoutable,

    #[error("Invalid destination: ({lat}, {lng})")]
    InvalidDestination { lat: f64, lng: f64 },

    #[error("Invalid routing settings: {0}")]
    InvalidSettings(String),
}
