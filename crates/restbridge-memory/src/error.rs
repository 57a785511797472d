//! Memory service errors.

use restbridge_model::ServiceError;
use thiserror::Error;

/// Errors raised by [`MemoryService`](crate::MemoryService).
#[derive(Debug, Error)]
pub enum MemoryError {
    /// No record is stored under the id.
    #[error("No record found for id '{0}'")]
    NotFound(String),

    /// The request body has the wrong shape.
    #[error("{0}")]
    InvalidData(String),

    /// A query parameter could not be applied.
    #[error("Invalid query parameter '{param}': {reason}")]
    InvalidQuery {
        /// The offending parameter.
        param: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl MemoryError {
    /// Shorthand for [`MemoryError::InvalidQuery`].
    pub(crate) fn invalid_query(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

impl From<MemoryError> for ServiceError {
    fn from(err: MemoryError) -> Self {
        let message = err.to_string();
        match err {
            MemoryError::NotFound(_) => Self::not_found(message),
            MemoryError::InvalidData(_) | MemoryError::InvalidQuery { .. } => {
                Self::bad_request(message)
            }
        }
    }
}
