//! Gateway event to RPC service dispatch layer for RestBridge.
//!
//! This crate turns a REST-shaped [`RequestEvent`](restbridge_model::RequestEvent)
//! into a call on a registered [`Service`], providing:
//!
//! - **Router**: resolves the service and resource id from the path, and maps
//!   the HTTP verb to a [`ServiceMethod`](restbridge_model::ServiceMethod)
//! - **Query**: de-flattens bracket-notation query keys and coerces values
//! - **Call**: assembles the fixed argument shape of each method
//! - **Dispatch**: the `Service` / `ServiceRegistry` traits and invocation
//! - **Adapter**: the one-time setup barrier and the full request pipeline
//! - **Response helpers**: `{"data": ...}` / `{"error": ...}` envelopes

pub mod adapter;
pub mod call;
pub mod dispatch;
pub mod query;
pub mod request;
pub mod response;
pub mod router;

pub use adapter::{Adapter, AdapterBuilder};
pub use call::ServiceCall;
pub use dispatch::{NotImplementedService, Service, ServiceMap, ServiceRegistry, ServiceResult};
pub use query::Query;
pub use router::ResolvedRoute;
