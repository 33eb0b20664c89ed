use super::notification::NotificationKey;
use super::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Access to the host order system.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>>;
    async fn all_orders(&self) -> Result<Vec<Order>>;

    /// Sets the status of an existing order, appending `note` to its history.
    ///
    /// Returns `false` when the order already had that status.
    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        note: &str,
    ) -> Result<bool>;
}

/// Record of notifications already applied.
#[async_trait]
pub trait NotificationLedger: Send + Sync {
    /// Records `key`. Returns `false` when it had been recorded before.
    async fn record(&self, key: NotificationKey) -> Result<bool>;

    /// Drops `key`, so a redelivery of the same notification is applied again.
    async fn forget(&self, key: &NotificationKey) -> Result<()>;
}

pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type NotificationLedgerRef = Arc<dyn NotificationLedger>;
