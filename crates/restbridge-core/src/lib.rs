//! Core configuration, errors, and shared adapter state for RestBridge.
//!
//! This crate provides the building blocks shared by the adapter, the
//! reference services, and the server binary: environment-driven
//! configuration and the per-adapter [`Variables`] store.

mod config;
mod error;
mod variables;

pub use config::BridgeConfig;
pub use error::{RestBridgeError, RestBridgeResult};
pub use variables::Variables;
