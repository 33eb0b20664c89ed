use crate::domain::money;
use crate::domain::payment::PaymentRequest;
use crate::error::{BridgeError, Result};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Placeholder sent when the customer has no usable name.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// Assembles an `INIT` payload from order data.
///
/// URLs are passed through as given; the caller owns their validity.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequestBuilder {
    amount: Option<Decimal>,
    currency: String,
    customer_name: Option<String>,
    success_url: Option<String>,
    cancel_url: Option<String>,
    notify_url: Option<String>,
    notify_method: Option<String>,
    metadata: Option<Map<String, Value>>,
}

impl PaymentRequestBuilder {
    pub fn new(amount: Option<Decimal>, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            ..Self::default()
        }
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn success_url(mut self, url: impl Into<String>) -> Self {
        self.success_url = Some(url.into());
        self
    }

    pub fn cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    pub fn notify_method(mut self, method: impl Into<String>) -> Self {
        self.notify_method = Some(method.into());
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Produces the request with `amount` expressed in `settlement_currency`.
    pub fn build(self, settlement_currency: &str, exchange_rate: Decimal) -> Result<PaymentRequest> {
        let currency = self.currency.trim().to_string();
        if currency.is_empty() {
            return Err(BridgeError::Validation("Currency is required".to_string()));
        }

        let amount = money::to_settlement(
            self.amount.unwrap_or(Decimal::ZERO),
            &currency,
            settlement_currency,
            exchange_rate,
        )?;

        let customer_name = self
            .customer_name
            .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());

        Ok(PaymentRequest {
            amount,
            currency,
            customer_name,
            metadata: self.metadata,
            success_url: self.success_url,
            cancel_url: self.cancel_url,
            notify_url: self.notify_url,
            notify_method: self.notify_method.unwrap_or_else(|| "POST".to_string()),
        })
    }
}
