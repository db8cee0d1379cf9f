use crate::broadcast::BroadcastHub;
use crate::checkout::CheckoutService;
use crate::clients::{DeliveryClient, HubClient, OrderClient, TrackingClient, WebhookClient};
use crate::error::FulfillmentError;
use crate::http::AppState;
use crate::inventory::InventoryStore;
use crate::lifecycle::config::FulfillmentConfig;
use crate::model::ProductId;
use crate::payment::PaymentReconciler;
use crate::routing::RoutePlanner;
use crate::telemetry::{AnomalyDetector, LatestIndex, LedgerContext, TelemetryIngestor};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Starts, wires and stops every fulfillment component.
///
/// # Wiring
///
/// | Actor | Context |
/// |---|---|
/// | `Order` | [`InventoryStore`] |
/// | `Delivery` | `()` |
/// | `TrackingEntry` | [`LedgerContext`] (clock and latest-row index) |
/// | `WebhookRecord` | [`OrderClient`] |
///
/// plus the [`BroadcastHub`] and a background task pruning expired webhook records.
///
/// # Example
///
/// ```ignore
/// let system = FulfillmentSystem::start(&config).await?;
/// let app = http::router(system.app_state());
/// // ... serve ...
/// system.shutdown().await?;
/// ```
pub struct FulfillmentSystem {
    pub inventory: InventoryStore,
    pub order_client: OrderClient,
    pub delivery_client: DeliveryClient,
    pub tracking_client: TrackingClient,
    pub webhook_client: WebhookClient,
    pub hub_client: HubClient,
    pub checkout: CheckoutService,
    pub ingestor: TelemetryIngestor,
    pub reconciler: PaymentReconciler,

    /// Actor tasks, awaited on shutdown.
    handles: Vec<JoinHandle<()>>,
    pruner: JoinHandle<()>,
}

impl FulfillmentSystem {
    /// Seeds the inventory, spawns the actors and wires their clients together.
    pub async fn start(config: &FulfillmentConfig) -> Result<Self, FulfillmentError> {
        // A zero mailbox capacity would panic inside tokio's channel constructor.
        config.validate().map_err(FulfillmentError::Validation)?;

        // 1. Shared stock table
        let inventory = InventoryStore::new(config.inventory.lock_timeout());
        for seed in &config.inventory.products {
            inventory
                .register_product(ProductId(seed.id), seed.name.clone(), seed.stock)
                .await?;
        }

        let planner = Arc::new(RoutePlanner::from_config(
            &config.routing,
            &config.directory,
        )?);

        // 2. Actors
        let capacity = config.actors.mailbox_capacity;
        let (order_actor, order_client) = crate::order_actor::new(capacity);
        let (delivery_actor, delivery_client) = crate::delivery_actor::new(capacity);
        let (tracking_actor, tracking_client) = crate::telemetry::new(capacity);
        let (webhook_actor, webhook_client) = crate::payment::new(capacity);
        let (hub, hub_client) = BroadcastHub::new(
            config.broadcast.hub_capacity,
            config.broadcast.subscriber_capacity,
        );

        let order_client = OrderClient::new(order_client);
        let delivery_client = DeliveryClient::new(delivery_client);
        let latest = LatestIndex::new();
        let tracking_client = TrackingClient::new(tracking_client, latest.clone());
        let webhook_client = WebhookClient::new(webhook_client);

        // 3. Start with injected context
        let handles = vec![
            tokio::spawn(webhook_actor.run(order_client.clone())),
            tokio::spawn(order_actor.run(inventory.clone())),
            tokio::spawn(delivery_actor.run(())),
            tokio::spawn(tracking_actor.run(LedgerContext::new(latest))),
            tokio::spawn(hub.run()),
        ];

        // 4. Services
        let checkout = CheckoutService::new(order_client.clone(), delivery_client.clone(), planner);
        let ingestor = TelemetryIngestor::new(
            tracking_client.clone(),
            delivery_client.clone(),
            order_client.clone(),
            hub_client.clone(),
            AnomalyDetector::from_config(&config.telemetry),
        );
        let reconciler = PaymentReconciler::new(webhook_client.clone(), &config.payments);
        if config.payments.stripe_webhook_secret.is_none() {
            warn!("No Stripe webhook secret configured, Stripe webhooks will be rejected");
        }

        let pruner = tokio::spawn(prune_loop(
            reconciler.clone(),
            Duration::from_secs(config.payments.prune_interval_secs.max(1)),
        ));

        info!(
            products = config.inventory.products.len(),
            partners = config.routing.partners.len(),
            "Fulfillment system started"
        );

        Ok(Self {
            inventory,
            order_client,
            delivery_client,
            tracking_client,
            webhook_client,
            hub_client,
            checkout,
            ingestor,
            reconciler,
            handles,
            pruner,
        })
    }

    /// Handler state for the HTTP router.
    pub fn app_state(&self) -> AppState {
        AppState {
            checkout: self.checkout.clone(),
            orders: self.order_client.clone(),
            deliveries: self.delivery_client.clone(),
            tracking: self.tracking_client.clone(),
            ingestor: self.ingestor.clone(),
            hub: self.hub_client.clone(),
            reconciler: self.reconciler.clone(),
        }
    }

    /// Stops the pruner, drops every client and waits for the actors to drain.
    ///
    /// Clones handed out through [`app_state`](Self::app_state) must be dropped first,
    /// otherwise the actors they point at keep running.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down fulfillment system...");

        let Self {
            inventory,
            order_client,
            delivery_client,
            tracking_client,
            webhook_client,
            hub_client,
            checkout,
            ingestor,
            reconciler,
            handles,
            pruner,
        } = self;

        pruner.abort();
        let _ = pruner.await;

        // Closing the mailboxes ends each run loop. The webhook actor holds an order
        // client as context, so the order actor stops after it.
        drop(checkout);
        drop(ingestor);
        drop(reconciler);
        drop(order_client);
        drop(delivery_client);
        drop(tracking_client);
        drop(webhook_client);
        drop(hub_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        match inventory.reconcile().await {
            Ok(drift) if drift.is_empty() => {}
            Ok(drift) => warn!(?drift, "Stock ledger drift at shutdown"),
            Err(e) => warn!(error = %e, "Stock ledger not reconciled"),
        }

        info!("Fulfillment system shutdown complete.");
        Ok(())
    }
}

async fn prune_loop(reconciler: PaymentReconciler, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = reconciler.prune_expired(Utc::now()).await {
            warn!(error = %e, "Webhook record pruning failed");
        }
    }
}
