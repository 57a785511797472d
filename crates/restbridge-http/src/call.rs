//! Argument assembly for service methods.
//!
//! Each method takes a fixed argument shape:
//!
//! | Method | Arguments |
//! |--------|-----------|
//! | `find` | `(query)` |
//! | `get` | `(id, query)` |
//! | `remove` | `(id?, query)` |
//! | `create` | `(data, query)` |
//! | `update` | `(id, data, query)` |
//! | `patch` | `(id, data, query)` |

use restbridge_model::{ResourceId, ServiceMethod};
use serde_json::Value;

use crate::query::Query;

/// A method together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// `find(query)`
    Find {
        /// Normalized query.
        query: Query,
    },
    /// `get(id, query)`
    Get {
        /// Resource id.
        id: ResourceId,
        /// Normalized query.
        query: Query,
    },
    /// `create(data, query)`
    Create {
        /// Decoded request body.
        data: Value,
        /// Normalized query.
        query: Query,
    },
    /// `update(id, data, query)`
    Update {
        /// Resource id.
        id: ResourceId,
        /// Decoded request body.
        data: Value,
        /// Normalized query.
        query: Query,
    },
    /// `patch(id, data, query)`
    Patch {
        /// Resource id.
        id: ResourceId,
        /// Decoded request body.
        data: Value,
        /// Normalized query.
        query: Query,
    },
    /// `remove(id, query)`; `id` is `None` for a bulk remove.
    Remove {
        /// Resource id, if any.
        id: Option<ResourceId>,
        /// Normalized query.
        query: Query,
    },
}

impl ServiceCall {
    /// Assemble the arguments for `method`.
    ///
    /// Arguments the method does not take are dropped. Returns `None` when
    /// the method needs an id and none was given.
    #[must_use]
    pub fn build(
        method: ServiceMethod,
        id: Option<ResourceId>,
        data: Value,
        query: Query,
    ) -> Option<Self> {
        let call = match method {
            ServiceMethod::Find => Self::Find { query },
            ServiceMethod::Get => Self::Get { id: id?, query },
            ServiceMethod::Create => Self::Create { data, query },
            ServiceMethod::Update => Self::Update {
                id: id?,
                data,
                query,
            },
            ServiceMethod::Patch => Self::Patch {
                id: id?,
                data,
                query,
            },
            ServiceMethod::Remove => Self::Remove { id, query },
        };
        Some(call)
    }

    /// The method this call invokes.
    #[must_use]
    pub fn method(&self) -> ServiceMethod {
        match self {
            Self::Find { .. } => ServiceMethod::Find,
            Self::Get { .. } => ServiceMethod::Get,
            Self::Create { .. } => ServiceMethod::Create,
            Self::Update { .. } => ServiceMethod::Update,
            Self::Patch { .. } => ServiceMethod::Patch,
            Self::Remove { .. } => ServiceMethod::Remove,
        }
    }

    /// The resource id argument, if the call has one.
    #[must_use]
    pub fn id(&self) -> Option<&ResourceId> {
        match self {
            Self::Get { id, .. } | Self::Update { id, .. } | Self::Patch { id, .. } => Some(id),
            Self::Remove { id, .. } => id.as_ref(),
            Self::Find { .. } | Self::Create { .. } => None,
        }
    }

    /// The query argument, present on every call.
    #[must_use]
    pub fn query(&self) -> &Query {
        match self {
            Self::Find { query }
            | Self::Get { query, .. }
            | Self::Create { query, .. }
            | Self::Update { query, .. }
            | Self::Patch { query, .. }
            | Self::Remove { query, .. } => query,
        }
    }
}
