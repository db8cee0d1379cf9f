//! # Checkout
//!
//! Validate the cart, plan routes, reserve stock and create the order, then open the
//! delivery. Routing runs first so an unroutable order never touches stock.

use crate::clients::{DeliveryClient, OrderClient};
use crate::error::FulfillmentError;
use crate::model::{CheckoutRequest, DeliveryId, OrderId, ProductId};
use crate::order_actor::validate_checkout;
use crate::routing::RoutePlanner;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub delivery_id: DeliveryId,
    pub tracking_number: String,
    pub total: Decimal,
    pub estimated_delivery_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrouted: Vec<ProductId>,
}

#[derive(Clone)]
pub struct CheckoutService {
    orders: OrderClient,
    deliveries: DeliveryClient,
    planner: Arc<RoutePlanner>,
}

impl CheckoutService {
    pub fn new(orders: OrderClient, deliveries: DeliveryClient, planner: Arc<RoutePlanner>) -> Self {
        Self {
            orders,
            deliveries,
            planner,
        }
    }

    #[instrument(skip(self, request), fields(items = request.cart_items.len()))]
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, FulfillmentError> {
        let create = validate_checkout(&request)?;
        let solution = self.planner.plan(
            &create.lines,
            create.shipping_address.location(),
            Utc::now(),
        )?;

        let order_id = self.orders.create_order(create).await?;
        let order = self.orders.fetch(order_id).await?;
        let unrouted = solution.unrouted.clone();

        let delivery = match self.deliveries.create_for_order(order_id, solution).await {
            Ok(id) => self.deliveries.fetch(id).await?,
            Err(e) => {
                // Compensate: release the reserved stock.
                error!(%order_id, error = %e, "Delivery creation failed, cancelling order");
                if let Err(cancel) = self.orders.cancel(order_id).await {
                    error!(%order_id, error = %cancel, "Compensating cancel failed");
                }
                return Err(e.into());
            }
        };

        info!(
            %order_id,
            delivery_id = %delivery.id,
            tracking_number = %delivery.tracking_number,
            "Checkout complete"
        );
        Ok(CheckoutReceipt {
            order_id,
            delivery_id: delivery.id,
            tracking_number: delivery.tracking_number,
            total: order.total,
            estimated_delivery_date: delivery.estimated_delivery_date,
            unrouted,
        })
    }
}
