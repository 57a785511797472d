//! In-memory reference service for RestBridge.
//!
//! [`MemoryService`] implements every method of the
//! [`Service`](restbridge_http::Service) contract over a concurrent map. It
//! backs the local server binary and the integration tests.

mod error;
pub mod filter;
mod service;

pub use error::MemoryError;
pub use filter::FindParams;
pub use service::MemoryService;
