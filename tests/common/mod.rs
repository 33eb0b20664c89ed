#![allow(dead_code)]

use eazzpay_bridge::application::client::ApiClient;
use eazzpay_bridge::application::gateway::GatewayAdapter;
use eazzpay_bridge::config::{Credentials, GatewayConfig};
use eazzpay_bridge::domain::order::{LineItem, Order};
use eazzpay_bridge::infrastructure::in_memory::{InMemoryNotificationLedger, InMemoryOrderStore};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const SECRET: &str = "sk_test_secret";

/// Configuration pointing at a mock processor mounted under `{uri}/api`.
pub fn config_for(uri: &str) -> GatewayConfig {
    let mut config = GatewayConfig::new(Credentials::new(format!("{uri}/api"), SECRET));
    config.public_url = "https://shop.test".to_string();
    config
}

pub fn order(id: &str, currency: &str, price: Decimal, digital: bool) -> Order {
    let mut order = Order::new(id, currency);
    order.billing.first_name = "Rahim".to_string();
    order.billing.last_name = "Uddin".to_string();
    order.items.push(LineItem {
        name: "Item".to_string(),
        quantity: 1,
        price,
        digital,
    });
    order
}

pub fn adapter(config: GatewayConfig, store: &InMemoryOrderStore) -> Arc<GatewayAdapter> {
    let config = Arc::new(config);
    let client = ApiClient::new(config.clone()).unwrap();
    Arc::new(GatewayAdapter::new(
        config,
        client,
        Arc::new(store.clone()),
        Arc::new(InMemoryNotificationLedger::new()),
    ))
}
