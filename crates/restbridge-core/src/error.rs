//! Error types for the RestBridge core.

/// Core error type for RestBridge infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum RestBridgeError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A variable could not be converted to the requested type.
    #[error("variable '{key}' has an unexpected type: {source}")]
    VariableType {
        /// The variable name.
        key: String,
        /// The underlying conversion error.
        source: serde_json::Error,
    },
}

/// Convenience result type for RestBridge operations.
pub type RestBridgeResult<T> = Result<T, RestBridgeError>;
