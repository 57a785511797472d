//! RPC method enum.

use std::fmt;

/// The fixed set of methods a service may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethod {
    /// List records matching a query.
    Find,
    /// Fetch a single record by id.
    Get,
    /// Create one or more records.
    Create,
    /// Replace a record.
    Update,
    /// Merge changes into a record.
    Patch,
    /// Remove a record, or every record matching a query.
    Remove,
}

impl ServiceMethod {
    /// Returns the method name as exposed by services.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
