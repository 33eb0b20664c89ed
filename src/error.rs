use crate::domain::order::OrderId;
use thiserror::Error;

/// Every failure the bridge can produce.
///
/// The first five variants mirror the failure origins of a gateway call:
/// configuration, input validation, transport, response decoding and
/// processor-reported failures. Client-facing operations flatten them into a
/// `PaymentResponse` message, so the `Display` text is the user-visible message.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Protocol(String),
    #[error("{0}")]
    Domain(String),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
