use crate::domain::order::{BillingAddress, LineItem, Order, OrderId, OrderStatus};
use crate::error::{BridgeError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// One line item of an order export.
#[derive(Debug, Deserialize)]
struct OrderRecord {
    order: String,
    #[serde(default)]
    status: Option<String>,
    currency: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    item: String,
    quantity: u32,
    price: Decimal,
    #[serde(default)]
    digital: bool,
}

/// Reads orders from a CSV export with one row per line item.
///
/// Rows sharing an `order` column are folded into a single order; order-level
/// columns are taken from the first row of each order.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Creates a new `OrderReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Reads every row and returns the orders in first-seen order.
    pub fn orders(self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = Vec::new();
        let mut index: HashMap<OrderId, usize> = HashMap::new();

        for record in self.reader.into_deserialize::<OrderRecord>() {
            let record = record?;
            let id = OrderId::new(record.order.clone());

            let position = match index.get(&id) {
                Some(position) => *position,
                None => {
                    orders.push(new_order(&record)?);
                    index.insert(id, orders.len() - 1);
                    orders.len() - 1
                }
            };

            if record.price.is_sign_negative() && !record.price.is_zero() {
                return Err(BridgeError::Validation(format!(
                    "Negative price for order {}",
                    record.order
                )));
            }

            orders[position].items.push(LineItem {
                name: record.item,
                quantity: record.quantity,
                price: record.price,
                digital: record.digital,
            });
        }

        Ok(orders)
    }
}

fn new_order(record: &OrderRecord) -> Result<Order> {
    let mut order = Order::new(record.order.as_str(), record.currency.to_ascii_uppercase());
    order.status = match record.status.as_deref() {
        Some(status) => status.parse()?,
        None => OrderStatus::Pending,
    };
    order.billing = BillingAddress {
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        email: record.email.clone(),
    };
    Ok(order)
}
