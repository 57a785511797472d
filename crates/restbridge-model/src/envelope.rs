//! Outbound response envelope.

use serde::{Deserialize, Serialize};

/// The `{statusCode, body}` structure returned for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// JSON encoded `{"data": ...}` or `{"error": ...}`.
    pub body: String,
}

impl ResponseEnvelope {
    /// The status as an [`http::StatusCode`].
    ///
    /// Envelopes are only built from valid statuses; anything else reads as 500.
    #[must_use]
    pub fn status(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.status_code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Parse the body back into JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}
