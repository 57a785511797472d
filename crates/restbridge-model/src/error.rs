//! RestBridge error types.
//!
//! [`BridgeError`] covers every failure the adapter turns into an error
//! envelope. [`ServiceError`] is what service methods return; it carries an
//! optional status code of its own.

use std::fmt;

/// Well-known RestBridge error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BridgeErrorCode {
    /// The path does not resolve to a registered service.
    ServiceNotFound,
    /// The verb/id combination has no method, or the service lacks it.
    MethodNotAllowed,
    /// The query string or body could not be decoded.
    MalformedInput,
    /// The one-time setup hook failed.
    SetupFailed,
    /// The invoked service method failed.
    ServiceFailure,
}

impl BridgeErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceNotFound => "ServiceNotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::MalformedInput => "MalformedInput",
            Self::SetupFailed => "SetupFailed",
            Self::ServiceFailure => "ServiceFailure",
        }
    }

    /// Returns the default HTTP status code for this error.
    ///
    /// `MethodNotAllowed` is reported as 404, not 405: an unmapped verb is
    /// treated as a route that does not exist.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::ServiceNotFound | Self::MethodNotAllowed => http::StatusCode::NOT_FOUND,
            Self::MalformedInput => http::StatusCode::BAD_REQUEST,
            Self::SetupFailed | Self::ServiceFailure => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for BridgeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A RestBridge error, rendered as `{"error": message}` with `status_code`.
#[derive(Debug)]
pub struct BridgeError {
    /// The error code.
    pub code: BridgeErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BridgeError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl BridgeError {
    /// Create a new `BridgeError` with a custom message.
    #[must_use]
    pub fn with_message(code: BridgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// The request path did not resolve to a service.
    #[must_use]
    pub fn service_not_found(path: &str) -> Self {
        Self::with_message(
            BridgeErrorCode::ServiceNotFound,
            format!("Service not found: {path}"),
        )
    }

    /// The verb has no method on the resolved service.
    #[must_use]
    pub fn method_not_allowed(verb: &str) -> Self {
        Self::with_message(
            BridgeErrorCode::MethodNotAllowed,
            format!("Method not allowed: {verb}"),
        )
    }

    /// A query key could not be parsed.
    #[must_use]
    pub fn malformed_query(key: &str) -> Self {
        Self::with_message(
            BridgeErrorCode::MalformedInput,
            format!("Malformed query parameter: {key}"),
        )
    }

    /// The request body could not be decoded.
    #[must_use]
    pub fn malformed_body(reason: impl fmt::Display) -> Self {
        Self::with_message(
            BridgeErrorCode::MalformedInput,
            format!("Malformed request body: {reason}"),
        )
    }

    /// The setup hook failed.
    #[must_use]
    pub fn setup_failed(reason: impl fmt::Display) -> Self {
        Self::with_message(BridgeErrorCode::SetupFailed, format!("Setup failed: {reason}"))
    }

    /// Wrap a failure returned by a service method.
    #[must_use]
    pub fn service_failure(error: ServiceError) -> Self {
        Self {
            code: BridgeErrorCode::ServiceFailure,
            status_code: error.status_code(),
            message: error.message.clone(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<ServiceError> for BridgeError {
    fn from(error: ServiceError) -> Self {
        Self::service_failure(error)
    }
}

/// Failure returned by a service method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Status code chosen by the service, if any.
    pub code: Option<u16>,
    /// Message reported verbatim to the caller.
    pub message: String,
}

impl ServiceError {
    /// A failure without a status code (reported as 500).
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// A failure with an explicit status code.
    #[must_use]
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    /// 405 for a method the service does not implement.
    #[must_use]
    pub fn method_not_implemented(method: impl fmt::Display) -> Self {
        Self::with_code(405, format!("Method `{method}` is not supported by this endpoint."))
    }

    /// The HTTP status this failure maps to.
    ///
    /// Codes outside 100-599 are not HTTP statuses and fall back to 500.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        self.code
            .filter(|c| (100..=599).contains(c))
            .and_then(|c| http::StatusCode::from_u16(c).ok())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
