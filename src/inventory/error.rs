//! Error types for the inventory store.

use crate::model::ProductId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// The product has no stock row.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Product already registered: {0}")]
    AlreadyRegistered(ProductId),

    /// The requested quantity exceeds what is left.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The row lock could not be acquired within the configured wait.
    #[error("Timed out waiting for stock row lock on {0}")]
    LockTimeout(ProductId),

    /// A staged change referenced a row the transaction does not hold.
    #[error("Product {0} is not locked by this transaction")]
    NotLocked(ProductId),
}
