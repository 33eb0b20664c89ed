use crate::error::{BridgeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an order in the host order system.
///
/// Kept as an opaque string: the processor echoes it back as the
/// notification `reference`, sometimes as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle states of an order as seen by the host order system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    OnHold,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::OnHold => "on-hold",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "on-hold" => Ok(OrderStatus::OnHold),
            other => Err(BridgeError::Validation(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

/// Status an order takes once its payment is complete, chosen by product type.
///
/// Only `on-hold`, `processing` and `completed` are meaningful post-payment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostPaymentStatus {
    physical: OrderStatus,
    digital: OrderStatus,
}

impl PostPaymentStatus {
    pub fn new(physical: OrderStatus, digital: OrderStatus) -> Result<Self> {
        for status in [physical, digital] {
            if !matches!(
                status,
                OrderStatus::OnHold | OrderStatus::Processing | OrderStatus::Completed
            ) {
                return Err(BridgeError::Configuration(format!(
                    "Post-payment status must be on-hold, processing or completed, got {status}"
                )));
            }
        }
        Ok(Self { physical, digital })
    }

    pub fn for_order(&self, order: &Order) -> OrderStatus {
        if order.is_digital() {
            self.digital
        } else {
            self.physical
        }
    }
}

impl Default for PostPaymentStatus {
    fn default() -> Self {
        Self {
            physical: OrderStatus::Processing,
            digital: OrderStatus::Completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl BillingAddress {
    /// "First Last", or an empty string when neither part is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    /// Downloadable or virtual product, no shipping involved.
    pub digital: bool,
}

impl LineItem {
    pub fn total(&self) -> Result<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(out_of_range)
    }
}

fn out_of_range() -> BridgeError {
    BridgeError::Validation("Amount out of range".to_string())
}

/// An order owned by the host order system.
///
/// The bridge reads it to build payment requests and writes only its status,
/// its transaction id and notes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub currency: String,
    pub billing: BillingAddress,
    pub items: Vec<LineItem>,
    pub transaction_id: Option<String>,
    pub notes: Vec<String>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: OrderStatus::Pending,
            currency: currency.into(),
            billing: BillingAddress::default(),
            items: Vec::new(),
            transaction_id: None,
            notes: Vec::new(),
        }
    }

    pub fn total(&self) -> Result<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.total()?).ok_or_else(out_of_range)
        })
    }

    /// True when every line item is digital. An order without items counts as physical.
    pub fn is_digital(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.digital)
    }

    /// Moves the order to `status` and records a note.
    ///
    /// Returns `false` without touching the order when it already has that status.
    pub fn set_status(&mut self, status: OrderStatus, note: &str) -> bool {
        if self.status == status {
            return false;
        }
        self.notes.push(format!(
            "Order status changed from {} to {}. {}",
            self.status, status, note
        ));
        self.status = status;
        true
    }

    /// Marks the payment complete and applies the configured post-payment status.
    pub fn payment_complete(
        &mut self,
        statuses: &PostPaymentStatus,
        transaction_id: Option<String>,
    ) -> bool {
        if transaction_id.is_some() {
            self.transaction_id = transaction_id;
        }
        let status = statuses.for_order(self);
        self.set_status(status, "Payment complete.")
    }
}
