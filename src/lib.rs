//! # Order Fulfillment Core
//!
//! Checkout-to-doorstep coordination built on resource-oriented actors: reserve stock and
//! create the order in one step, plan shipping routes, open a trackable delivery, ingest
//! telemetry with anomaly alerts, fan live updates out to subscribers, and reconcile
//! payment webhooks exactly once.
//!
//! ## 🏗️ Architecture Notes
//!
//! ### 1. One generic actor, many resources
//! `ResourceActor<T: ActorEntity>` runs the message loop once for every resource: orders,
//! deliveries, tracking entries and webhook records. Each actor processes its mailbox
//! sequentially, so its own state needs no locks, and a unique-key check followed by an
//! insert cannot interleave with another create.
//!
//! ### 2. Late context injection
//! Collaborators are injected when the loop starts (`actor.run(context)`): the order actor
//! gets the [`InventoryStore`](inventory::InventoryStore), the webhook-record actor gets an
//! [`OrderClient`](clients::OrderClient), the tracking ledger gets a
//! [`LedgerContext`](telemetry::LedgerContext) (server clock and latest-row index).
//!
//! ### 3. Typed errors end to end
//! Every component has its own `thiserror` enum. Entity errors raised inside an actor come
//! back through the framework boxed and are recovered by downcast in the typed clients, so
//! `InsufficientStock` is never confused with a dead actor. At the boundary they fold into
//! [`FulfillmentError`](error::FulfillmentError).
//!
//! ### 4. Locks only where stock moves
//! The only blocking locks are the per-product row locks of a
//! [`StockTransaction`](inventory::StockTransaction), taken in sorted order with a bounded
//! wait. Route planning is pure, telemetry is unlocked read-then-write, broadcast never waits.
//!
//! ## 🗺️ Module Tour
//!
//! | Layer | Modules |
//! |---|---|
//! | Engine | [`framework`] |
//! | Data | [`model`], [`inventory`] |
//! | Actors | [`order_actor`], [`delivery_actor`], [`telemetry`], [`payment`] |
//! | Pure logic | [`routing`] |
//! | Services | [`checkout`], [`broadcast`], [`clients`] |
//! | Boundary | [`http`], [`lifecycle`], [`error`] |
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- fulfillment.yaml
//! cargo test
//! ```

pub mod broadcast;
pub mod checkout;
pub mod clients;
pub mod delivery_actor;
pub mod error;
pub mod framework;
pub mod http;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod payment;
pub mod routing;
pub mod telemetry;
