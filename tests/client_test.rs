mod common;

use common::{SECRET, config_for};
use eazzpay_bridge::application::client::{ApiClient, SECRET_HEADER};
use eazzpay_bridge::config::{Credentials, GatewayConfig};
use eazzpay_bridge::domain::payment::PaymentRequest;
use reqwest::Method;
use rust_decimal_macros::dec;
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(config: GatewayConfig) -> ApiClient {
    ApiClient::new(Arc::new(config)).unwrap()
}

fn request() -> PaymentRequest {
    PaymentRequest {
        amount: dec!(1200),
        currency: "BDT".to_string(),
        customer_name: "Rahim Uddin".to_string(),
        metadata: None,
        success_url: Some("https://shop.test/payment/success?order_id=1".to_string()),
        cancel_url: Some("https://shop.test/payment/cancel?order_id=1".to_string()),
        notify_url: Some("https://shop.test/payment/ipn".to_string()),
        notify_method: "POST".to_string(),
    }
}

#[tokio::test]
async fn test_init_sends_secret_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .and(header(SECRET_HEADER, SECRET))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "amount": 1200.0,
            "cus_name": "Rahim Uddin",
            "success_url": "https://shop.test/payment/success?order_id=1",
            "cancel_url": "https://shop.test/payment/cancel?order_id=1",
            "ipn_url": "https://shop.test/payment/ipn",
            "ipn_method": "POST"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Payment initiated",
            "data": { "redirect_url": "https://pay.test/checkout/inv_1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(config_for(&server.uri()))
        .create_payment(&request())
        .await;

    assert!(response.success);
    assert_eq!(response.redirect_url(), Some("https://pay.test/checkout/inv_1"));
    assert_eq!(response.message.as_deref(), Some("Payment initiated"));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = GatewayConfig::new(Credentials::new(format!("{}/api/", server.uri()), SECRET));
    let status = client(config).payment_status("INV-1").await;
    assert_eq!(status, "PENDING");
}

#[tokio::test]
async fn test_processor_failure_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "Invalid amount"
        })))
        .mount(&server)
        .await;

    let response = client(config_for(&server.uri()))
        .create_payment(&request())
        .await;

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Invalid amount"));
}

#[tokio::test]
async fn test_non_json_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let response = client(config_for(&server.uri()))
        .create_payment(&request())
        .await;

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Invalid JSON response from API"));
    assert!(response.body.is_none());
}

#[tokio::test]
async fn test_transport_failure_is_a_failure() {
    // Nothing listens on the discard port.
    let response = client(config_for("http://127.0.0.1:9"))
        .send("INIT", &json!({}), Method::POST)
        .await;

    assert!(!response.success);
    assert!(!response.message.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_no_request_without_credentials_or_known_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let mut unconfigured = config_for(&server.uri());
    unconfigured.credentials.secret_key = String::new();
    let response = client(unconfigured).create_payment(&request()).await;
    assert_eq!(
        response.message.as_deref(),
        Some("API credentials are not configured")
    );

    let response = client(config_for(&server.uri()))
        .send("REFUND", &json!({}), Method::POST)
        .await;
    assert_eq!(response.message.as_deref(), Some("Invalid API endpoint type"));
}

#[tokio::test]
async fn test_payment_status_unknown_on_failure() {
    let status = client(config_for("http://127.0.0.1:9"))
        .payment_status("INV-1")
        .await;
    assert_eq!(status, "UNKNOWN");
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_debug_logging_never_contains_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "redirect_url": "https://pay.test/checkout/inv_1" }
        })))
        .mount(&server)
        .await;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("eazzpay_bridge=debug"))
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut config = config_for(&server.uri());
    config.debug = true;
    let response = client(config).create_payment(&request()).await;
    assert!(response.success);

    let output = logs.contents();
    assert!(output.contains("Sending payment API request"));
    assert!(output.contains("Payment API response"));
    assert!(!output.contains(SECRET));
}
