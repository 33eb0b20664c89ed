use super::builder::PaymentRequestBuilder;
use super::client::ApiClient;
use super::reconciler::{OrderReconciler, ReconcileOutcome};
use crate::config::{GatewayConfig, ReturnPolicy};
use crate::domain::notification::{ProcessorStatus, WebhookNotification};
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::{NotificationLedgerRef, OrderStoreRef};
use crate::error::{BridgeError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Order-system-facing façade of the bridge.
///
/// Starts payments and applies the three possible outcomes: the success
/// redirect, the cancel redirect and the processor notification.
pub struct GatewayAdapter {
    config: Arc<GatewayConfig>,
    client: ApiClient,
    orders: OrderStoreRef,
    reconciler: OrderReconciler,
}

impl GatewayAdapter {
    pub fn new(
        config: Arc<GatewayConfig>,
        client: ApiClient,
        orders: OrderStoreRef,
        ledger: NotificationLedgerRef,
    ) -> Self {
        let reconciler = OrderReconciler::new(orders.clone(), ledger, config.post_payment_status);
        Self {
            config,
            client,
            orders,
            reconciler,
        }
    }

    /// Whether the gateway can take payments at all.
    pub fn is_valid_for_use(&self) -> bool {
        self.config.credentials.is_configured()
    }

    /// Builds the `INIT` payload for `order`.
    pub fn payment_request(&self, order: &Order) -> Result<PaymentRequest> {
        let order_id = order.id.as_str();
        let mut metadata = Map::new();
        metadata.insert("order_id".to_string(), Value::from(order_id));

        PaymentRequestBuilder::new(Some(order.total()?), order.currency.clone())
            .customer_name(order.billing.full_name())
            .success_url(self.config.success_url(order_id))
            .cancel_url(self.config.cancel_url(order_id))
            .notify_url(self.config.notify_url())
            .notify_method(self.config.notify_method.clone())
            .metadata(metadata)
            .build(&self.config.settlement_currency, self.config.exchange_rate)
    }

    /// Requests a hosted payment page and returns its URL.
    ///
    /// The order is marked pending only once a URL has been received.
    pub async fn initiate(&self, order_id: &OrderId) -> Result<String> {
        let order = self.load(order_id).await?;
        let request = self.payment_request(&order)?;
        let response = self.client.create_payment(&request).await;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Payment initiation failed".to_string());
            tracing::warn!(order_id = %order_id, %message, "Payment initiation rejected");
            return Err(BridgeError::Domain(message));
        }

        let redirect_url = response
            .redirect_url()
            .ok_or_else(|| BridgeError::Domain("Payment URL not received".to_string()))?
            .to_string();

        self.orders
            .update_status(
                order_id,
                OrderStatus::Pending,
                "Awaiting payment on the hosted payment page.",
            )
            .await?;

        tracing::info!(order_id = %order_id, amount = %request.amount, "Payment initiated");
        Ok(redirect_url)
    }

    /// Handles the browser's return from the payment page; returns the thank-you URL.
    ///
    /// Under [`ReturnPolicy::Verify`] the payment is only marked complete when
    /// the processor confirms `invoice_id` as `COMPLETED` for this order and
    /// amount; otherwise the order waits for the notification.
    pub async fn handle_success(&self, order_id: &OrderId, invoice_id: Option<&str>) -> Result<String> {
        let mut order = self.load(order_id).await?;
        let invoice_id = invoice_id.map(str::trim).filter(|id| !id.is_empty());

        let confirmed = match self.config.return_policy {
            ReturnPolicy::Trust => true,
            ReturnPolicy::Verify => match invoice_id {
                Some(invoice_id) => self.verify_return(&order, invoice_id).await?,
                None => false,
            },
        };

        if confirmed {
            let before = order.clone();
            order.payment_complete(
                &self.config.post_payment_status,
                invoice_id.map(str::to_string),
            );
            if order != before {
                self.orders.store(order).await?;
            }
            tracing::info!(order_id = %order_id, "Payment confirmed on return");
        } else {
            tracing::info!(
                order_id = %order_id,
                invoice_id = ?invoice_id,
                "Return not confirmed, awaiting processor notification"
            );
        }

        Ok(self.config.thank_you_url(order_id.as_str()))
    }

    /// Handles the browser's cancel redirect; returns the cart URL.
    pub async fn handle_cancel(&self, order_id: &OrderId) -> Result<String> {
        self.orders
            .update_status(order_id, OrderStatus::Cancelled, "Payment cancelled by customer.")
            .await?;
        tracing::info!(order_id = %order_id, "Payment cancelled");
        Ok(self.config.cart_url())
    }

    /// Validates and applies an IPN body.
    pub async fn handle_notification(&self, body: &Value) -> Result<ReconcileOutcome> {
        let notification = WebhookNotification::from_value(body)?;
        self.reconcile(&notification).await
    }

    /// Applies an already validated notification.
    pub async fn reconcile(&self, notification: &WebhookNotification) -> Result<ReconcileOutcome> {
        self.reconciler.reconcile(notification).await
    }

    /// Whether the processor reports `invoice_id` as paid for exactly `order`.
    async fn verify_return(&self, order: &Order, invoice_id: &str) -> Result<bool> {
        let response = self.client.verify_payment(invoice_id).await;
        let status = ProcessorStatus::parse(response.field("status").unwrap_or_default());
        if status != ProcessorStatus::Completed {
            return Ok(false);
        }

        let reference = response.order_reference();
        if reference.as_deref() != Some(order.id.as_str()) {
            tracing::warn!(
                order_id = %order.id,
                invoice_id,
                reference = ?reference,
                "Verified invoice belongs to another order"
            );
            return Ok(false);
        }

        let expected = self.payment_request(order)?.amount;
        let charged = response.amount();
        if charged != Some(expected) {
            tracing::warn!(
                order_id = %order.id,
                invoice_id,
                %expected,
                charged = ?charged,
                "Verified amount does not match the order"
            );
            return Ok(false);
        }

        Ok(true)
    }

    async fn load(&self, order_id: &OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| BridgeError::OrderNotFound(order_id.clone()))
    }
}
