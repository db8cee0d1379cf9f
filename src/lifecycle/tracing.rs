//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a `tracing-subscriber` formatter filtered by `RUST_LOG`
//! (default `info`). The module path prefix is hidden (`with_target(false)`); spans from
//! `#[instrument]` on the client calls show the request path inline instead.
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Full payloads: clients log them once at entry with `debug!(?params, ...)`
//! RUST_LOG=debug cargo run
//!
//! # One JSON object per line, for log shippers
//! FULFILLMENT_LOG_FORMAT=json cargo run
//! ```
//!
//! A checkout at `info` reads roughly:
//!
//! ```text
//! INFO checkout:create_order: Created entity_type="Order" id=order_1 size=1
//! INFO checkout:create_for_order: Created entity_type="Delivery" id=delivery_1 size=1
//! INFO checkout: Checkout complete order_id=order_1 delivery_id=delivery_1 tracking_number=TRK-3F2A9C01B7D4
//! ```

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the output format (`compact` or `json`).
pub const LOG_FORMAT_ENV_VAR: &str = "FULFILLMENT_LOG_FORMAT";

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match std::env::var(LOG_FORMAT_ENV_VAR).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.compact().init(),
    }
}
