//! Plain data structures shared across the actors: ids, entities, DTOs and wire types.
//!
//! Entities here implement [`ActorEntity`](crate::framework::ActorEntity) in their actor
//! module (`order_actor::entity`, `delivery_actor::entity`, ...), keeping the data and the
//! behaviour apart.

/// Declares a `u32`-backed id newtype with the `prefix_N` display form used in logs.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

pub mod delivery;
pub mod logistics;
pub mod order;
pub mod product;
pub mod tracking;
pub mod webhook;

pub use delivery::*;
pub use logistics::*;
pub use order::*;
pub use product::*;
pub use tracking::*;
pub use webhook::*;
