//! Generic actor framework for resource management.
//!
//! Every stateful fulfillment resource runs as a [`ResourceActor`]: one Tokio task owning
//! the store, processing requests in order, reached through a cloneable [`ResourceClient`].
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that manages entities
//! - [`ResourceClient`] - Type-safe handle for sending requests
//! - [`ActorClient`] - Shared `get`/`delete` for the domain clients
//! - [`FrameworkError`] - Plumbing errors, plus the boxed entity error
//!
//! # Testing
//!
//! See [`mock`] for utilities to test code around a client without spawning its actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
