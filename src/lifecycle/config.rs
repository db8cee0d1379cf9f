//! # Configuration
//!
//! Layered loading with the `config` crate. Later sources override earlier ones:
//!
//! 1. `fulfillment.yaml` in the working directory (optional)
//! 2. the file passed to [`FulfillmentConfig::load`] (required if given)
//! 3. the file named by `FULFILLMENT_CONFIG` (required if set)
//! 4. `FULFILLMENT__<SECTION>__<KEY>` environment variables
//!
//! ```bash
//! FULFILLMENT__SERVER__PORT=9090 FULFILLMENT__TELEMETRY__MAX_TEMPERATURE_C=6 cargo run
//! ```
//!
//! Every section has defaults, so an empty configuration starts a working (if empty)
//! system.

use crate::model::DeliveryPartner;
use crate::routing::{SelectorKind, UnroutablePolicy};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fulfillment";
/// Environment variable naming an extra config file.
pub const CONFIG_ENV_VAR: &str = "FULFILLMENT_CONFIG";
/// Prefix for per-key environment overrides.
pub const CONFIG_ENV_PREFIX: &str = "FULFILLMENT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FulfillmentConfig {
    pub server: ServerConfig,
    pub actors: ActorConfig,
    pub inventory: InventoryConfig,
    pub routing: RoutingConfig,
    pub telemetry: TelemetryConfig,
    pub broadcast: BroadcastConfig,
    pub payments: PaymentsConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long shutdown waits for actors to drain.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
        }
    }
}

/// A product row seeded into the inventory at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub id: u32,
    pub name: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Bounded wait for each stock row lock.
    pub lock_timeout_ms: u64,
    pub products: Vec<ProductSeed>,
}

impl InventoryConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
            products: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub average_speed_kmh: f64,
    pub base_fee: Decimal,
    pub per_km_rate: Decimal,
    pub delivery_sla_days: i64,
    pub unroutable_policy: UnroutablePolicy,
    pub partner_selector: SelectorKind,
    pub partners: Vec<DeliveryPartner>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 60.0,
            base_fee: Decimal::new(500, 2),
            per_km_rate: Decimal::new(50, 2),
            delivery_sla_days: 3,
            unroutable_policy: UnroutablePolicy::default(),
            partner_selector: SelectorKind::default(),
            partners: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Displacement from the previous reading that raises `route_deviation`.
    pub deviation_threshold_km: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            deviation_threshold_km: 5.0,
            min_temperature_c: 2.0,
            max_temperature_c: 8.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Hub mailbox size; publishes beyond it are dropped.
    pub hub_capacity: usize,
    /// Per-subscriber buffer; a full buffer drops updates for that subscriber only.
    pub subscriber_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            hub_capacity: 1_024,
            subscriber_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    /// Stripe endpoint signing secret. Without it every Stripe webhook is rejected.
    pub stripe_webhook_secret: Option<String>,
    pub signature_tolerance_secs: i64,
    /// Minimum age before an idempotency record may be pruned.
    pub retention_hours: i64,
    pub prune_interval_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_webhook_secret: None,
            signature_tolerance_secs: 300,
            retention_hours: 72,
            prune_interval_secs: 3_600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductSupplier {
    pub product_id: u32,
    pub supplier_id: String,
}

/// Supplier and hub locations, normally owned by a location service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub hubs: Vec<PointConfig>,
    pub suppliers: Vec<PointConfig>,
    pub product_suppliers: Vec<ProductSupplier>,
}

impl FulfillmentConfig {
    /// Load configuration from files and environment.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config: FulfillmentConfig = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate().map_err(config::ConfigError::Message)?;
        Ok(config)
    }

    /// Rejects settings no component can run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.actors.mailbox_capacity == 0 {
            return Err("actors.mailbox_capacity must be positive".into());
        }
        if self.broadcast.hub_capacity == 0 || self.broadcast.subscriber_capacity == 0 {
            return Err("broadcast capacities must be positive".into());
        }
        if !(self.routing.average_speed_kmh > 0.0) {
            return Err("routing.average_speed_kmh must be positive".into());
        }
        if self.telemetry.min_temperature_c > self.telemetry.max_temperature_c {
            return Err("telemetry temperature band is inverted".into());
        }
        if self.payments.prune_interval_secs == 0 {
            return Err("payments.prune_interval_secs must be positive".into());
        }
        if !(self.telemetry.deviation_threshold_km >= 0.0) {
            return Err("telemetry.deviation_threshold_km must not be negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FulfillmentConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.deviation_threshold_km, 5.0);
        assert_eq!(config.routing.base_fee, Decimal::new(5, 0));
        assert_eq!(config.payments.retention_hours, 72);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_sections_override_defaults() {
        let yaml = r#"
telemetry:
  max_temperature_c: 6.5
routing:
  unroutable_policy: flag_partial
  partners:
    - id: p1
      name: Swift
directory:
  hubs:
    - { id: h1, name: Hub, lat: 48.0, lng: 2.0 }
  product_suppliers:
    - { product_id: 1, supplier_id: s1 }
"#;
        let config: FulfillmentConfig = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.telemetry.max_temperature_c, 6.5);
        assert_eq!(config.telemetry.min_temperature_c, 2.0);
        assert_eq!(config.routing.unroutable_policy, UnroutablePolicy::FlagPartial);
        assert_eq!(config.routing.partners[0].id, "p1");
        assert_eq!(config.directory.hubs.len(), 1);
        assert_eq!(config.directory.product_suppliers[0].product_id, 1);
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let mut config = FulfillmentConfig::default();
        config.telemetry.min_temperature_c = 9.0;
        assert!(config.validate().is_err());
    }
}
