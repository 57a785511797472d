//! Request body decoding.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use restbridge_model::{BridgeError, RequestEvent};
use serde_json::{Map, Value};

/// Decode the event body as JSON.
///
/// A missing or empty body decodes to an empty object. Base64 bodies are
/// decoded first when the event says so.
pub fn decode_body(event: &RequestEvent) -> Result<Value, BridgeError> {
    let Some(body) = event.body.as_deref().filter(|b| !b.is_empty()) else {
        return Ok(Value::Object(Map::new()));
    };

    let bytes: Cow<'_, [u8]> = if event.is_base64_encoded {
        let decoded = BASE64
            .decode(body)
            .map_err(|e| BridgeError::malformed_body(&e).with_source(e))?;
        Cow::Owned(decoded)
    } else {
        Cow::Borrowed(body.as_bytes())
    };

    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(&bytes).map_err(|e| BridgeError::malformed_body(&e).with_source(e))
}
