use crate::config::GatewayConfig;
use crate::domain::payment::{PaymentRequest, PaymentResponse};
use crate::error::{BridgeError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the shared secret on every processor call.
pub const SECRET_HEADER: &str = "eazzpay-client-secret";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Operations the processor exposes, with their path relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Init,
    Verify,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Init => "payments/initiate",
            Endpoint::Verify => "verify-payment",
        }
    }
}

impl FromStr for Endpoint {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INIT" => Ok(Endpoint::Init),
            "VERIFY" => Ok(Endpoint::Verify),
            _ => Err(BridgeError::Validation(
                "Invalid API endpoint type".to_string(),
            )),
        }
    }
}

/// HTTP client for the payment processor.
///
/// Never fails past its own boundary: every error, whatever its origin, comes
/// back as a `PaymentResponse` with `success == false`.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<GatewayConfig>,
    http_client: Client,
}

impl ApiClient {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Sends `payload` to the endpoint registered under `operation`.
    pub async fn send<T>(&self, operation: &str, payload: &T, method: Method) -> PaymentResponse
    where
        T: Serialize + ?Sized,
    {
        match self.try_send(operation, payload, method).await {
            Ok(body) => PaymentResponse::from_body(body),
            Err(err) => {
                tracing::warn!(operation, error = %err, "Payment API request failed");
                PaymentResponse::failure(err.to_string())
            }
        }
    }

    async fn try_send<T>(&self, operation: &str, payload: &T, method: Method) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        self.validate_credentials()?;
        let url = self.build_url(operation.parse()?);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(SECRET_HEADER, &self.config.credentials.secret_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if method == Method::POST || method == Method::PUT {
            request = request.json(payload);
        }

        if self.config.debug {
            let params = serde_json::to_string(payload).unwrap_or_default();
            tracing::debug!(%url, %method, %params, "Sending payment API request");
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body: Value = serde_json::from_str(&text)
            .map_err(|_| BridgeError::Protocol("Invalid JSON response from API".to_string()))?;

        if self.config.debug {
            tracing::debug!(%url, status = status.as_u16(), response = %body, "Payment API response");
        }

        Ok(body)
    }

    fn validate_credentials(&self) -> Result<()> {
        if self.config.credentials.is_configured() {
            Ok(())
        } else {
            Err(BridgeError::Configuration(
                "API credentials are not configured".to_string(),
            ))
        }
    }

    fn build_url(&self, endpoint: Endpoint) -> String {
        let base_url = self.config.credentials.base_url.trim_end_matches('/');
        format!("{}/{}", base_url, endpoint.path())
    }

    /// Requests a hosted payment page for `request`.
    pub async fn create_payment(&self, request: &PaymentRequest) -> PaymentResponse {
        if request.currency.trim().is_empty() {
            return PaymentResponse::failure("Currency is required");
        }
        self.send("INIT", request, Method::POST).await
    }

    /// Asks the processor for the state of an invoice.
    pub async fn verify_payment(&self, invoice_id: &str) -> PaymentResponse {
        let invoice_id = invoice_id.trim();
        if invoice_id.is_empty() {
            return PaymentResponse::failure("Invoice ID is required");
        }
        self.send("VERIFY", &json!({ "invoice_id": invoice_id }), Method::POST)
            .await
    }

    /// The processor's status string for an invoice, or `UNKNOWN`.
    pub async fn payment_status(&self, invoice_id: &str) -> String {
        self.verify_payment(invoice_id)
            .await
            .field("status")
            .unwrap_or("UNKNOWN")
            .to_string()
    }
}
