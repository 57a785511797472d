//! Named-variable store shared by every invocation of one adapter.
//!
//! Provides [`Variables`], a concurrent key/value bag that setup hooks use to
//! publish settings (connection strings, feature flags) to the rest of the
//! adapter. It lives as long as the adapter that owns it and is never torn
//! down explicitly.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RestBridgeError, RestBridgeResult};

/// Thread-safe named-variable store.
///
/// Uses `DashMap` so concurrent invocations can read and write without a
/// global lock.
///
/// # Examples
///
/// ```
/// use restbridge_core::Variables;
///
/// let vars = Variables::new();
/// vars.set("paginate", serde_json::json!({"default": 10}))
///     .set("name", "users");
/// assert_eq!(vars.get("name"), Some(serde_json::json!("users")));
/// ```
#[derive(Debug, Default)]
pub struct Variables {
    inner: DashMap<String, Value>,
}

impl Variables {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Set a variable, replacing any previous value. Returns `self` so calls
    /// can be chained.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner.insert(key.into(), value.into());
        self
    }

    /// Get a copy of a variable's value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|v| v.value().clone())
    }

    /// Get a variable deserialized into `T`.
    ///
    /// Returns `Ok(None)` when the variable is unset.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> RestBridgeResult<Option<T>> {
        self.get(key)
            .map(|v| {
                serde_json::from_value(v).map_err(|source| RestBridgeError::VariableType {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Whether a variable is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
