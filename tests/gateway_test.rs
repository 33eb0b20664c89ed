mod common;

use common::{adapter, config_for, order};
use eazzpay_bridge::config::ReturnPolicy;
use eazzpay_bridge::domain::order::{OrderId, OrderStatus};
use eazzpay_bridge::domain::ports::OrderStore;
use eazzpay_bridge::error::BridgeError;
use eazzpay_bridge::infrastructure::in_memory::InMemoryOrderStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn failed_order_store(id: &str) -> InMemoryOrderStore {
    let store = InMemoryOrderStore::with_orders([order(id, "USD", dec!(10), false)]);
    store
        .update_status(&OrderId::new(id), OrderStatus::Failed, "Earlier attempt failed.")
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_initiate_converts_amount_and_marks_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .and(body_partial_json(json!({
            "amount": 1200.0,
            "cus_name": "Rahim Uddin",
            "metadata": { "order_id": "77" },
            "success_url": "https://shop.test/payment/success?order_id=77",
            "ipn_method": "POST"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "redirect_url": "https://pay.test/checkout/77" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = failed_order_store("77").await;
    let adapter = adapter(config_for(&server.uri()), &store);

    let redirect_url = adapter.initiate(&OrderId::new("77")).await.unwrap();
    assert_eq!(redirect_url, "https://pay.test/checkout/77");

    let order = store.get(&OrderId::new("77")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_initiate_without_redirect_url_does_not_mutate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "invoice_id": "INV-77" }
        })))
        .mount(&server)
        .await;

    let store = failed_order_store("77").await;
    let before = store.get(&OrderId::new("77")).await.unwrap().unwrap();
    let adapter = adapter(config_for(&server.uri()), &store);

    let result = adapter.initiate(&OrderId::new("77")).await;
    assert!(
        matches!(result, Err(BridgeError::Domain(message)) if message == "Payment URL not received")
    );

    let after = store.get(&OrderId::new("77")).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_initiate_reports_processor_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Merchant suspended"
        })))
        .mount(&server)
        .await;

    let store = failed_order_store("5").await;
    let adapter = adapter(config_for(&server.uri()), &store);

    let result = adapter.initiate(&OrderId::new("5")).await;
    assert!(matches!(result, Err(BridgeError::Domain(message)) if message == "Merchant suspended"));
}

#[tokio::test]
async fn test_initiate_unknown_order() {
    let adapter = adapter(config_for("http://127.0.0.1:9"), &InMemoryOrderStore::new());
    let result = adapter.initiate(&OrderId::new("404")).await;
    assert!(matches!(result, Err(BridgeError::OrderNotFound(_))));
}

#[tokio::test]
async fn test_verified_return_completes_payment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-payment"))
        .and(body_json(json!({ "invoice_id": "INV-12" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "invoice_id": "INV-12",
            "amount": 500.0,
            "metadata": { "order_id": "12" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = InMemoryOrderStore::with_orders([order("12", "BDT", dec!(500), false)]);
    let adapter = adapter(config_for(&server.uri()), &store);

    let url = adapter
        .handle_success(&OrderId::new("12"), Some("INV-12"))
        .await
        .unwrap();
    assert_eq!(url, "https://shop.test/checkout/order-received/12");

    let order = store.get(&OrderId::new("12")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.transaction_id.as_deref(), Some("INV-12"));
}

#[tokio::test]
async fn test_unconfirmed_return_leaves_order_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "PENDING" })))
        .mount(&server)
        .await;

    let store = InMemoryOrderStore::with_orders([order("12", "BDT", dec!(500), false)]);
    let adapter = adapter(config_for(&server.uri()), &store);

    adapter
        .handle_success(&OrderId::new("12"), Some("INV-12"))
        .await
        .unwrap();

    let order = store.get(&OrderId::new("12")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.transaction_id.is_none());
}

#[tokio::test]
async fn test_trusted_return_skips_verification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri());
    config.return_policy = ReturnPolicy::Trust;
    let store = InMemoryOrderStore::with_orders([order("12", "BDT", dec!(500), false)]);
    let adapter = adapter(config, &store);

    adapter.handle_success(&OrderId::new("12"), None).await.unwrap();

    let order = store.get(&OrderId::new("12")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
}

async fn mount_verified_invoice(server: &MockServer, order_id: &str, amount: f64) {
    Mock::given(method("POST"))
        .and(path("/api/verify-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "invoice_id": "INV-A",
            "amount": amount,
            "metadata": { "order_id": order_id }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_invoice_of_another_order_does_not_complete() {
    let server = MockServer::start().await;
    mount_verified_invoice(&server, "A", 1.0).await;

    let store = InMemoryOrderStore::with_orders([
        order("A", "BDT", dec!(1), true),
        order("B", "BDT", dec!(50000), true),
    ]);
    let adapter = adapter(config_for(&server.uri()), &store);

    let url = adapter
        .handle_success(&OrderId::new("B"), Some("INV-A"))
        .await
        .unwrap();
    assert_eq!(url, "https://shop.test/checkout/order-received/B");

    let order = store.get(&OrderId::new("B")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.transaction_id.is_none());
}

#[tokio::test]
async fn test_underpaid_invoice_does_not_complete() {
    let server = MockServer::start().await;
    mount_verified_invoice(&server, "B", 1.0).await;

    let store = InMemoryOrderStore::with_orders([order("B", "BDT", dec!(50000), true)]);
    let adapter = adapter(config_for(&server.uri()), &store);

    adapter
        .handle_success(&OrderId::new("B"), Some("INV-A"))
        .await
        .unwrap();

    let order = store.get(&OrderId::new("B")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_initiate_rejects_out_of_range_total() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut huge = order("X", "BDT", Decimal::MAX, false);
    huge.items.push(huge.items[0].clone());
    let store = InMemoryOrderStore::with_orders([huge]);
    let adapter = adapter(config_for(&server.uri()), &store);

    let result = adapter.initiate(&OrderId::new("X")).await;
    assert!(
        matches!(result, Err(BridgeError::Validation(message)) if message == "Amount out of range")
    );
}
