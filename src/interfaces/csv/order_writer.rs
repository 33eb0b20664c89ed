use crate::domain::order::Order;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderStateRecord<'a> {
    order: &'a str,
    status: &'a str,
    transaction_id: &'a str,
}

/// Writes the final state of orders as `order,status,transaction_id` CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: impl IntoIterator<Item = Order>) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderStateRecord {
                order: order.id.as_str(),
                status: order.status.as_str(),
                transaction_id: order.transaction_id.as_deref().unwrap_or_default(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[test]
    fn test_writes_header_and_rows() {
        let mut paid = Order::new("1", "BDT");
        paid.status = OrderStatus::Completed;
        paid.transaction_id = Some("INV-1".to_string());

        let mut buffer = Vec::new();
        OrderWriter::new(&mut buffer)
            .write_orders([paid, Order::new("2", "BDT")])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "order,status,transaction_id\n1,completed,INV-1\n2,pending,\n"
        );
    }
}
