use crate::domain::notification::NotificationKey;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{NotificationLedger, OrderStore};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// Stands in for the host order system when the bridge runs on its own
/// (CLI, tests, the bundled HTTP server).
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `orders`.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id.clone(), order))
            .collect();
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        note: &str,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| BridgeError::OrderNotFound(order_id.clone()))?;
        Ok(order.set_status(status, note))
    }
}

/// In-memory duplicate-delivery ledger.
#[derive(Default, Clone)]
pub struct InMemoryNotificationLedger {
    seen: Arc<RwLock<HashSet<NotificationKey>>>,
}

impl InMemoryNotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationLedger for InMemoryNotificationLedger {
    async fn record(&self, key: NotificationKey) -> Result<bool> {
        let mut seen = self.seen.write().await;
        Ok(seen.insert(key))
    }

    async fn forget(&self, key: &NotificationKey) -> Result<()> {
        let mut seen = self.seen.write().await;
        seen.remove(key);
        Ok(())
    }
}
