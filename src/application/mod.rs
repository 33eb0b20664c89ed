//! Application layer: the processor client, the request builder, the
//! notification reconciler and the gateway façade that ties them to the
//! order system.

pub mod builder;
pub mod client;
pub mod gateway;
pub mod reconciler;
