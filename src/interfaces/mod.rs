//! Adapters between the outside world and the gateway: CSV files for the
//! command line, HTTP for the browser and the processor.

pub mod csv;
pub mod http;
