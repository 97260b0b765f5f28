//! Real-time plate verification over websockets.
//!
//! Each connection runs a sequential loop: decode the query, resolve the plate
//! against the record stores, append a scan log when the registration is
//! known, then reply.

pub mod config;
pub mod db;
pub mod decoder;
pub mod memory;
pub mod metrics;
pub mod resolver;
pub mod scanlog;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
pub mod websocket;

#[cfg(test)]
mod testutil;

pub use crate::config::Config;
pub use crate::service::PlateCheck;
pub use crate::store::{StoreError, Stores};
