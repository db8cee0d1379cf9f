//! [`ActorEntity`] implementation for [`Order`].
//!
//! The order actor's context is the [`InventoryStore`]: creating an order is the stock
//! reservation transaction, and cancelling one is the release transaction.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::inventory::InventoryStore;
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, PaymentStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::convert::Infallible;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = Infallible;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = InventoryStore;
    type Error = OrderError;

    /// Builds the order with its price snapshots and totals.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.lines.is_empty() {
            return Err(OrderError::ValidationError("order has no lines".into()));
        }
        if let Some(line) = params.lines.iter().find(|l| l.quantity == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity for {} must be positive",
                line.product_id
            )));
        }
        Order::new(id, params)
            .ok_or_else(|| OrderError::ValidationError("order total is too large".into()))
    }

    /// Reserves every line in one stock transaction.
    ///
    /// Any failure drops the transaction uncommitted, and the actor never stores the
    /// order, so a rejected order leaves neither items nor movements behind.
    async fn on_create(&mut self, inventory: &InventoryStore) -> Result<(), OrderError> {
        let mut tx = inventory
            .begin(self.items.iter().map(|item| item.product_id))
            .await?;
        for item in &self.items {
            tx.reserve(item.product_id, item.quantity, self.id)?;
        }
        let movements = tx.commit().await;
        info!(order_id = %self.id, movements = movements.len(), total = %self.total, "Stock reserved");
        Ok(())
    }

    async fn on_update(&mut self, update: Infallible, _: &InventoryStore) -> Result<(), OrderError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        inventory: &InventoryStore,
    ) -> Result<OrderActionResult, OrderError> {
        let changed = match action {
            OrderAction::ApplyPayment(next) => self.apply_payment(next),
            OrderAction::Advance(next) => self.advance(next)?,
            OrderAction::Cancel => self.cancel(inventory).await?,
        };
        if changed {
            self.updated_at = Utc::now();
        }
        Ok(OrderActionResult {
            order: self.clone(),
            changed,
        })
    }
}

impl Order {
    fn apply_payment(&mut self, next: PaymentStatus) -> bool {
        if !self.payment_status.can_move_to(next) {
            debug!(order_id = %self.id, current = ?self.payment_status, ?next, "Stale payment status ignored");
            return false;
        }
        self.payment_status = next;
        if next == PaymentStatus::Paid && self.status == OrderStatus::Pending {
            self.status = OrderStatus::Paid;
        }
        true
    }

    fn advance(&mut self, next: OrderStatus) -> Result<bool, OrderError> {
        if next == self.status {
            return Ok(false);
        }
        match (self.status.rank(), next.rank()) {
            (Some(current), Some(target)) if target > current => {
                self.status = next;
                Ok(true)
            }
            _ => Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            }),
        }
    }

    async fn cancel(&mut self, inventory: &InventoryStore) -> Result<bool, OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Ok(false);
        }
        if !self.status.is_cancellable() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }

        let mut tx = inventory
            .begin(self.items.iter().map(|item| item.product_id))
            .await?;
        for item in &self.items {
            tx.release(item.product_id, item.quantity, self.id)?;
        }
        tx.commit().await;

        self.status = OrderStatus::Cancelled;
        info!(order_id = %self.id, "Order cancelled, stock released");
        Ok(true)
    }
}
