use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of an `INIT` call, in the processor's wire format.
///
/// `amount` is always expressed in the settlement currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Store currency the amount was converted from. Not sent to the processor.
    #[serde(skip)]
    pub currency: String,
    #[serde(rename = "cus_name")]
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(rename = "ipn_url", skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(rename = "ipn_method")]
    pub notify_method: String,
}

/// The `data` object of a processor response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Uniform result of every call to the processor.
///
/// Transport, decoding and processor failures all look the same to callers:
/// `success == false` plus a message. Callers must check `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    /// The parsed response body, verbatim.
    #[serde(skip)]
    pub body: Option<Value>,
}

impl PaymentResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            body: None,
        }
    }

    /// Wraps a parsed processor body.
    ///
    /// The processor's own boolean `success` flag is passed through; a body
    /// without one is treated as successful since it parsed.
    pub fn from_body(body: Value) -> Self {
        let success = body.get("success").and_then(Value::as_bool).unwrap_or(true);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = body
            .get("data")
            .filter(|data| data.is_object())
            .and_then(|data| serde_json::from_value::<ResponseData>(data.clone()).ok());

        Self {
            success,
            message,
            data,
            body: Some(body),
        }
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.redirect_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    /// A top-level string field of the raw body, e.g. `status` on verify responses.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name)?.as_str()
    }

    /// The `metadata.order_id` echoed back by the processor.
    pub fn order_reference(&self) -> Option<String> {
        match self.lookup("metadata")?.get("order_id")? {
            Value::String(id) => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// The amount the processor charged, as a number or numeric string.
    pub fn amount(&self) -> Option<Decimal> {
        match self.lookup("amount")? {
            Value::String(amount) => amount.trim().parse().ok(),
            Value::Number(amount) => amount.to_string().parse().ok(),
            _ => None,
        }
    }

    /// `name` at the top level of the body, or under `data`.
    fn lookup(&self, name: &str) -> Option<&Value> {
        let body = self.body.as_ref()?;
        body.get(name)
            .or_else(|| body.get("data").and_then(|data| data.get(name)))
    }
}
