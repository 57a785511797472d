//! Response envelope formatting.

use restbridge_model::{BridgeError, ResponseEnvelope};
use serde_json::Value;

/// Content type of every envelope body.
pub const CONTENT_TYPE: &str = "application/json";

/// Status of a successful invocation.
const STATUS_OK: u16 = 200;

/// Wrap a service result as `{"data": ...}` with status 200.
#[must_use]
pub fn success_envelope(data: &Value) -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: STATUS_OK,
        body: serde_json::json!({ "data": data }).to_string(),
    }
}

/// Serialize an error as `{"error": message}`.
///
/// ```json
/// {"error": "Service not found: /unknown"}
/// ```
#[must_use]
pub fn error_to_json(error: &BridgeError) -> String {
    serde_json::json!({ "error": error.message }).to_string()
}

/// Convert a `BridgeError` into an error envelope.
#[must_use]
pub fn error_to_envelope(error: &BridgeError) -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: error.status_code.as_u16(),
        body: error_to_json(error),
    }
}
