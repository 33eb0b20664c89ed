use crate::domain::order::{OrderStatus, PostPaymentStatus};
use crate::error::{BridgeError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use std::str::FromStr;

pub const LIVE_API_URL: &str = "https://pay.eazzpay.com/api";
pub const SANDBOX_API_URL: &str = "https://sandbox.eazzpay.com/api";

/// Currency the processor bills in unless configured otherwise.
pub const DEFAULT_SETTLEMENT_CURRENCY: &str = "BDT";
pub const DEFAULT_EXCHANGE_RATE: Decimal = dec!(120);

const ENV_PREFIX: &str = "EAZZPAY_";

/// Processor endpoint and shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.secret_key.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[redacted]")
            .finish()
    }
}

/// What the browser-facing success endpoint may conclude on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnPolicy {
    /// Ask the processor before marking the payment complete.
    #[default]
    Verify,
    /// Mark the payment complete on the redirect alone.
    Trust,
}

impl FromStr for ReturnPolicy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(ReturnPolicy::Verify),
            "trust" => Ok(ReturnPolicy::Trust),
            other => Err(BridgeError::Configuration(format!(
                "Unknown return policy: {other}"
            ))),
        }
    }
}

/// Gateway configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    pub sandbox: bool,
    pub debug: bool,
    pub store_currency: String,
    pub settlement_currency: String,
    pub exchange_rate: Decimal,
    pub post_payment_status: PostPaymentStatus,
    /// Public base URL of this service, used to build return and notify URLs.
    pub public_url: String,
    pub notify_method: String,
    pub return_policy: ReturnPolicy,
}

impl GatewayConfig {
    /// Builds a configuration around explicit credentials with default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            sandbox: false,
            debug: false,
            store_currency: DEFAULT_SETTLEMENT_CURRENCY.to_string(),
            settlement_currency: DEFAULT_SETTLEMENT_CURRENCY.to_string(),
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            post_payment_status: PostPaymentStatus::default(),
            public_url: "http://localhost:8080".to_string(),
            notify_method: "POST".to_string(),
            return_policy: ReturnPolicy::default(),
        }
    }

    /// Loads the configuration from `EAZZPAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which receives full variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let sandbox = var("SANDBOX").map(|v| parse_flag("SANDBOX", &v)).transpose()?;
        let sandbox = sandbox.unwrap_or(false);
        let base_url = var("API_URL").unwrap_or_else(|| {
            if sandbox {
                SANDBOX_API_URL.to_string()
            } else {
                LIVE_API_URL.to_string()
            }
        });
        let credentials = Credentials::new(base_url, var("SECRET_KEY").unwrap_or_default());

        let mut config = Self::new(credentials);
        config.sandbox = sandbox;

        if let Some(debug) = var("DEBUG") {
            config.debug = parse_flag("DEBUG", &debug)?;
        }
        if let Some(currency) = var("STORE_CURRENCY") {
            config.store_currency = currency.to_ascii_uppercase();
        }
        if let Some(currency) = var("SETTLEMENT_CURRENCY") {
            config.settlement_currency = currency.to_ascii_uppercase();
        }
        if let Some(rate) = var("EXCHANGE_RATE") {
            config.exchange_rate = rate.parse().map_err(|_| {
                BridgeError::Configuration(format!("Invalid EAZZPAY_EXCHANGE_RATE: {rate}"))
            })?;
        }

        let physical = var("PHYSICAL_PRODUCT_STATUS")
            .map(|v| v.parse::<OrderStatus>())
            .transpose()?
            .unwrap_or(OrderStatus::Processing);
        let digital = var("DIGITAL_PRODUCT_STATUS")
            .map(|v| v.parse::<OrderStatus>())
            .transpose()?
            .unwrap_or(OrderStatus::Completed);
        config.post_payment_status = PostPaymentStatus::new(physical, digital)?;

        if let Some(url) = var("PUBLIC_URL") {
            config.public_url = url.trim_end_matches('/').to_string();
        }
        if let Some(method) = var("IPN_METHOD") {
            let method = method.to_ascii_uppercase();
            if method != "POST" && method != "GET" {
                return Err(BridgeError::Configuration(format!(
                    "EAZZPAY_IPN_METHOD must be POST or GET, got {method}"
                )));
            }
            config.notify_method = method;
        }
        if let Some(policy) = var("RETURN_POLICY") {
            config.return_policy = policy.parse()?;
        }

        Ok(config)
    }

    /// Whether store amounts need converting before they reach the processor.
    pub fn needs_conversion(&self) -> bool {
        !self
            .store_currency
            .eq_ignore_ascii_case(&self.settlement_currency)
    }

    pub fn success_url(&self, order_id: &str) -> String {
        format!("{}/payment/success?order_id={order_id}", self.public_url)
    }

    pub fn cancel_url(&self, order_id: &str) -> String {
        format!("{}/payment/cancel?order_id={order_id}", self.public_url)
    }

    pub fn notify_url(&self) -> String {
        format!("{}/payment/ipn", self.public_url)
    }

    pub fn thank_you_url(&self, order_id: &str) -> String {
        format!("{}/checkout/order-received/{order_id}", self.public_url)
    }

    pub fn cart_url(&self) -> String {
        format!("{}/cart", self.public_url)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BridgeError::Configuration(format!(
            "Invalid {ENV_PREFIX}{name}: {value}"
        ))),
    }
}
