use super::order::{OrderId, OrderStatus};
use crate::error::{BridgeError, Result};
use serde_json::Value;
use std::fmt;

/// Payment status vocabulary used by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcessorStatus {
    Completed,
    Failed,
    Pending,
    Canceled,
    Other(String),
}

impl ProcessorStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => ProcessorStatus::Completed,
            "FAILED" => ProcessorStatus::Failed,
            "PENDING" => ProcessorStatus::Pending,
            "CANCELED" | "CANCELLED" => ProcessorStatus::Canceled,
            _ => ProcessorStatus::Other(raw.trim().to_string()),
        }
    }

    /// The order status this processor status drives, if any.
    ///
    /// `Completed` maps to `None` here because completion goes through
    /// `Order::payment_complete`, which picks the post-payment status.
    pub fn order_status(&self) -> Option<OrderStatus> {
        match self {
            ProcessorStatus::Failed => Some(OrderStatus::Failed),
            ProcessorStatus::Pending => Some(OrderStatus::Pending),
            ProcessorStatus::Canceled => Some(OrderStatus::Cancelled),
            ProcessorStatus::Completed | ProcessorStatus::Other(_) => None,
        }
    }
}

impl fmt::Display for ProcessorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorStatus::Completed => f.write_str("COMPLETED"),
            ProcessorStatus::Failed => f.write_str("FAILED"),
            ProcessorStatus::Pending => f.write_str("PENDING"),
            ProcessorStatus::Canceled => f.write_str("CANCELED"),
            ProcessorStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// An IPN delivery from the processor. Consumed once, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookNotification {
    pub reference: OrderId,
    pub status: ProcessorStatus,
    /// Processor-side invoice or transaction id, when supplied.
    pub invoice_id: Option<String>,
    /// Per-delivery identifier, when the processor supplies one.
    pub delivery_id: Option<String>,
}

impl WebhookNotification {
    /// Validates an arbitrary JSON body.
    ///
    /// `reference` and `status` are required; `reference` may be a string or a number.
    pub fn from_value(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| invalid("body is not a JSON object"))?;

        let reference = object
            .get("reference")
            .and_then(scalar_to_string)
            .ok_or_else(|| invalid("missing reference"))?;

        let status = object
            .get("status")
            .and_then(Value::as_str)
            .filter(|status| !status.trim().is_empty())
            .ok_or_else(|| invalid("missing status"))?;

        let invoice_id = ["invoice_id", "transaction_id"]
            .iter()
            .find_map(|key| object.get(*key).and_then(scalar_to_string));
        let delivery_id = ["delivery_id", "event_id"]
            .iter()
            .find_map(|key| object.get(*key).and_then(scalar_to_string));

        Ok(Self {
            reference: OrderId::new(reference),
            status: ProcessorStatus::parse(status),
            invoice_id,
            delivery_id,
        })
    }

    pub fn key(&self) -> NotificationKey {
        NotificationKey {
            order_id: self.reference.clone(),
            status: self.status.clone(),
            delivery_id: self.delivery_id.clone(),
        }
    }
}

/// Identity of a delivery for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub order_id: OrderId,
    pub status: ProcessorStatus,
    pub delivery_id: Option<String>,
}

fn invalid(reason: &str) -> BridgeError {
    BridgeError::Validation(format!("Invalid notification: {reason}"))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
