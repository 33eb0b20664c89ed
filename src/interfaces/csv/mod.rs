pub mod notification_reader;
pub mod order_reader;
pub mod order_writer;
