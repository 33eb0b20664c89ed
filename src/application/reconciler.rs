use crate::domain::notification::{ProcessorStatus, WebhookNotification};
use crate::domain::order::{OrderStatus, PostPaymentStatus};
use crate::domain::ports::{NotificationLedgerRef, OrderStoreRef};
use crate::error::{BridgeError, Result};

/// What a notification did to its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order moved to this status.
    Applied(OrderStatus),
    /// The order already reflected the notification.
    Unchanged,
    /// The same notification was applied before.
    Duplicate,
    /// The processor status has no counterpart in the order lifecycle.
    Ignored,
}

/// Applies processor notifications to orders.
pub struct OrderReconciler {
    orders: OrderStoreRef,
    ledger: NotificationLedgerRef,
    post_payment_status: PostPaymentStatus,
}

impl OrderReconciler {
    pub fn new(
        orders: OrderStoreRef,
        ledger: NotificationLedgerRef,
        post_payment_status: PostPaymentStatus,
    ) -> Self {
        Self {
            orders,
            ledger,
            post_payment_status,
        }
    }

    /// Applies `notification` to the referenced order.
    ///
    /// Redelivery of a notification already applied leaves the order untouched.
    pub async fn reconcile(&self, notification: &WebhookNotification) -> Result<ReconcileOutcome> {
        let mut order = self
            .orders
            .get(&notification.reference)
            .await?
            .ok_or_else(|| BridgeError::OrderNotFound(notification.reference.clone()))?;

        if let ProcessorStatus::Other(status) = &notification.status {
            tracing::info!(
                order_id = %notification.reference,
                status = %status,
                "Ignoring notification with unrecognised status"
            );
            return Ok(ReconcileOutcome::Ignored);
        }

        let key = notification.key();
        if !self.ledger.record(key.clone()).await? {
            tracing::info!(
                order_id = %notification.reference,
                status = %notification.status,
                "Duplicate notification, skipping"
            );
            return Ok(ReconcileOutcome::Duplicate);
        }

        let before = order.clone();
        match notification.status.order_status() {
            Some(status) => {
                order.set_status(
                    status,
                    &format!("Processor reported {}.", notification.status),
                );
            }
            None => {
                order.payment_complete(&self.post_payment_status, notification.invoice_id.clone());
            }
        }

        if order == before {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let status = order.status;
        if let Err(err) = self.orders.store(order).await {
            self.ledger.forget(&key).await?;
            return Err(err);
        }

        tracing::info!(
            order_id = %notification.reference,
            processor_status = %notification.status,
            order_status = %status,
            "Order reconciled from notification"
        );

        if before.status == status {
            Ok(ReconcileOutcome::Unchanged)
        } else {
            Ok(ReconcileOutcome::Applied(status))
        }
    }
}
