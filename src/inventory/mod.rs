//! # Inventory Store
//!
//! Product stock rows plus the append-only stock movement ledger.
//!
//! Stock is the one piece of shared mutable state that many orders contend on, so it is not
//! an actor: each row sits behind its own `tokio::sync::Mutex` and a [`StockTransaction`]
//! holds the rows it touches for exactly its own lifetime.
//!
//! ## Transactions
//!
//! ```rust,ignore
//! let mut tx = inventory.begin([product_a, product_b]).await?; // locks in sorted order
//! tx.reserve(product_a, 2, order_id)?;                          // staged, not applied
//! tx.reserve(product_b, 1, order_id)?;
//! tx.commit().await;                                            // rows + ledger together
//! ```
//!
//! Dropping a transaction without calling `commit` discards everything it staged.
//! Locks are always taken in ascending `ProductId` order, each bounded by the configured
//! wait, so two orders over overlapping products can not deadlock.

pub mod error;

pub use error::*;

use crate::model::{LedgerDrift, MovementKind, OrderId, ProductId, StockLevel, StockMovement};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
struct StockRow {
    name: String,
    stock_quantity: u32,
    in_stock: bool,
}

struct Inner {
    rows: RwLock<HashMap<ProductId, Arc<Mutex<StockRow>>>>,
    ledger: Mutex<Vec<StockMovement>>,
    lock_timeout: Duration,
}

/// Cloneable handle to the shared stock table and ledger.
#[derive(Clone)]
pub struct InventoryStore {
    inner: Arc<Inner>,
}

impl InventoryStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                rows: RwLock::new(HashMap::new()),
                ledger: Mutex::new(Vec::new()),
                lock_timeout,
            }),
        }
    }

    /// Adds a product row and its opening `initial` movement.
    #[instrument(skip(self, name))]
    pub async fn register_product(
        &self,
        product_id: ProductId,
        name: impl Into<String>,
        stock_quantity: u32,
    ) -> Result<(), InventoryError> {
        let mut rows = self.inner.rows.write().await;
        if rows.contains_key(&product_id) {
            return Err(InventoryError::AlreadyRegistered(product_id));
        }
        rows.insert(
            product_id,
            Arc::new(Mutex::new(StockRow {
                name: name.into(),
                stock_quantity,
                in_stock: stock_quantity > 0,
            })),
        );

        let mut ledger = self.inner.ledger.lock().await;
        let id = ledger.len() as u64 + 1;
        ledger.push(StockMovement {
            id,
            product_id,
            order_id: None,
            delta: i64::from(stock_quantity),
            kind: MovementKind::Initial,
            recorded_at: Utc::now(),
        });
        info!(%product_id, stock_quantity, "Product registered");
        Ok(())
    }

    /// Opens a transaction holding the row locks of every product in `product_ids`.
    pub async fn begin(
        &self,
        product_ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<StockTransaction, InventoryError> {
        let ids: BTreeSet<ProductId> = product_ids.into_iter().collect();

        let handles = {
            let rows = self.inner.rows.read().await;
            ids.iter()
                .map(|id| {
                    rows.get(id)
                        .cloned()
                        .map(|row| (*id, row))
                        .ok_or(InventoryError::UnknownProduct(*id))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut guards = BTreeMap::new();
        for (id, row) in handles {
            match tokio::time::timeout(self.inner.lock_timeout, row.lock_owned()).await {
                Ok(guard) => {
                    guards.insert(id, guard);
                }
                Err(_) => {
                    warn!(product_id = %id, timeout_ms = self.inner.lock_timeout.as_millis() as u64, "Row lock timeout");
                    return Err(InventoryError::LockTimeout(id));
                }
            }
        }
        debug!(locked = guards.len(), "Transaction opened");

        Ok(StockTransaction {
            store: self.clone(),
            guards,
            staged: Vec::new(),
        })
    }

    pub async fn stock_level(&self, product_id: ProductId) -> Result<StockLevel, InventoryError> {
        let row = self
            .inner
            .rows
            .read()
            .await
            .get(&product_id)
            .cloned()
            .ok_or(InventoryError::UnknownProduct(product_id))?;
        let row = tokio::time::timeout(self.inner.lock_timeout, row.lock())
            .await
            .map_err(|_| InventoryError::LockTimeout(product_id))?;
        Ok(StockLevel {
            product_id,
            name: row.name.clone(),
            stock_quantity: row.stock_quantity,
            in_stock: row.in_stock,
        })
    }

    pub async fn movements_for_product(&self, product_id: ProductId) -> Vec<StockMovement> {
        let ledger = self.inner.ledger.lock().await;
        ledger
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect()
    }

    pub async fn movements_for_order(&self, order_id: OrderId) -> Vec<StockMovement> {
        let ledger = self.inner.ledger.lock().await;
        ledger
            .iter()
            .filter(|m| m.order_id == Some(order_id))
            .cloned()
            .collect()
    }

    /// Checks every row against the sum of its ledger deltas.
    ///
    /// Locks the whole table for the duration, so callers get a consistent snapshot.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<Vec<LedgerDrift>, InventoryError> {
        let ids: Vec<ProductId> = self.inner.rows.read().await.keys().copied().collect();
        let tx = self.begin(ids).await?;

        let mut sums: HashMap<ProductId, i64> = HashMap::new();
        for movement in self.inner.ledger.lock().await.iter() {
            *sums.entry(movement.product_id).or_default() += movement.delta;
        }

        let drift: Vec<LedgerDrift> = tx
            .guards
            .iter()
            .filter_map(|(id, row)| {
                let ledger_sum = sums.get(id).copied().unwrap_or_default();
                (ledger_sum != i64::from(row.stock_quantity)).then(|| LedgerDrift {
                    product_id: *id,
                    stock_quantity: row.stock_quantity,
                    ledger_sum,
                })
            })
            .collect();

        if drift.is_empty() {
            info!(products = tx.guards.len(), "Ledger reconciled");
        } else {
            warn!(drifted = drift.len(), "Ledger drift detected");
        }
        Ok(drift)
    }
}

#[derive(Debug)]
struct Staged {
    product_id: ProductId,
    order_id: OrderId,
    delta: i64,
    kind: MovementKind,
}

/// Exclusive hold on a set of stock rows with staged, not yet applied, changes.
pub struct StockTransaction {
    store: InventoryStore,
    guards: BTreeMap<ProductId, OwnedMutexGuard<StockRow>>,
    staged: Vec<Staged>,
}

impl StockTransaction {
    fn pending_delta(&self, product_id: ProductId) -> i64 {
        self.staged
            .iter()
            .filter(|s| s.product_id == product_id)
            .map(|s| s.delta)
            .sum()
    }

    /// Stages a `sale` of `quantity` units for `order_id`.
    ///
    /// Fails with `InsufficientStock` if the row, after earlier staged changes in this
    /// transaction, cannot cover the quantity.
    pub fn reserve(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<(), InventoryError> {
        let row = self
            .guards
            .get(&product_id)
            .ok_or(InventoryError::NotLocked(product_id))?;
        let available = i64::from(row.stock_quantity) + self.pending_delta(product_id);

        if !row.in_stock || available < i64::from(quantity) {
            return Err(InventoryError::InsufficientStock {
                product_id,
                requested: quantity,
                available: available.max(0) as u32,
            });
        }

        self.staged.push(Staged {
            product_id,
            order_id,
            delta: -i64::from(quantity),
            kind: MovementKind::Sale,
        });
        Ok(())
    }

    /// Stages a `return` of `quantity` units previously reserved by `order_id`.
    pub fn release(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<(), InventoryError> {
        if !self.guards.contains_key(&product_id) {
            return Err(InventoryError::NotLocked(product_id));
        }
        self.staged.push(Staged {
            product_id,
            order_id,
            delta: i64::from(quantity),
            kind: MovementKind::Return,
        });
        Ok(())
    }

    /// Applies all staged changes and appends their movements, then releases the rows.
    pub async fn commit(mut self) -> Vec<StockMovement> {
        let staged = std::mem::take(&mut self.staged);
        let mut ledger = self.store.inner.ledger.lock().await;
        let recorded_at = Utc::now();
        let mut committed = Vec::with_capacity(staged.len());

        for change in staged {
            if let Some(row) = self.guards.get_mut(&change.product_id) {
                let next = i64::from(row.stock_quantity) + change.delta;
                row.stock_quantity = next.clamp(0, i64::from(u32::MAX)) as u32;
                row.in_stock = row.stock_quantity > 0;
            }
            let movement = StockMovement {
                id: ledger.len() as u64 + 1,
                product_id: change.product_id,
                order_id: Some(change.order_id),
                delta: change.delta,
                kind: change.kind,
                recorded_at,
            };
            ledger.push(movement.clone());
            committed.push(movement);
        }

        debug!(movements = committed.len(), "Transaction committed");
        committed
    }
}

impl Drop for StockTransaction {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            debug!(discarded = self.staged.len(), "Transaction rolled back");
        }
    }
}
