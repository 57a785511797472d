//! Inbound gateway event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An API Gateway style proxy event.
///
/// Only the fields the adapter reads are modelled; anything else in the
/// incoming JSON is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    /// Request path, e.g. `/users/7`.
    #[serde(default)]
    pub path: Option<String>,
    /// HTTP verb exactly as received.
    #[serde(default)]
    pub http_method: String,
    /// Query parameters with every value of repeated keys.
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<BTreeMap<String, Vec<String>>>,
    /// Query parameters with only the last value of repeated keys.
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64 encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl RequestEvent {
    /// Create an event for a verb and path with no query or body.
    #[must_use]
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            http_method: http_method.into(),
            ..Self::default()
        }
    }

    /// Append a value to the multi-value query parameters.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.multi_value_query_string_parameters
            .get_or_insert_with(BTreeMap::new)
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The query parameters as a multi-value map.
    ///
    /// Prefers the multi-value map; falls back to the single-value map with
    /// each value wrapped in a one-element list.
    #[must_use]
    pub fn query_parameters(&self) -> BTreeMap<String, Vec<String>> {
        if let Some(multi) = &self.multi_value_query_string_parameters {
            return multi.clone();
        }
        self.query_string_parameters
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), vec![v.clone()]))
            .collect()
    }
}
