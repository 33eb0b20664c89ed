//! Domain types of the payment bridge: orders, payment requests and responses,
//! processor notifications and the ports the application layer depends on.

pub mod money;
pub mod notification;
pub mod order;
pub mod payment;
pub mod ports;
