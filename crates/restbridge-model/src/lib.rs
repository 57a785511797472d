//! Model types for RestBridge.
//!
//! These types describe the data that crosses the adapter boundary: the
//! gateway [`RequestEvent`](event::RequestEvent) coming in, the
//! [`ResponseEnvelope`](envelope::ResponseEnvelope) going out, the closed set
//! of [`ServiceMethod`](method::ServiceMethod)s, resource identifiers, and the
//! error taxonomy.

pub mod envelope;
pub mod error;
pub mod event;
pub mod id;
pub mod method;

pub use envelope::ResponseEnvelope;
pub use error::{BridgeError, BridgeErrorCode, ServiceError};
pub use event::RequestEvent;
pub use id::{ResourceId, parse_number};
pub use method::ServiceMethod;
