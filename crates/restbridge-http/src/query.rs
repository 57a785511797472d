//! Query string normalization.
//!
//! Gateways hand over the query string as a flat multi-value map whose keys
//! may use bracket notation:
//!
//! ```text
//! filter[name]=bob        -> {"filter": {"name": "bob"}}
//! tags[]=a&tags[]=b       -> {"tags": ["a", "b"]}
//! $limit=10&active=true   -> {"$limit": 10, "active": true}
//! ```
//!
//! Each raw key is parsed once into a [`KeyPath`]; values are then built by
//! recursive descent over its segments and merged under the base name.

use std::collections::BTreeMap;

use restbridge_model::{BridgeError, parse_number};
use serde_json::{Map, Value};

/// A normalized query: nested JSON object keyed by base parameter name.
pub type Query = Map<String, Value>;

/// One bracketed part of a query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySegment {
    /// `[name]`
    Key(String),
    /// `[]`
    Array,
}

/// A query key split into its base name and bracket segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    /// Text before the first bracket.
    pub base: String,
    /// Bracket segments in order.
    pub segments: Vec<KeySegment>,
}

impl KeyPath {
    /// Parse a raw query key.
    ///
    /// Returns `None` for unbalanced brackets, text between or after bracket
    /// groups, or a bracketed key with no base name.
    ///
    /// # Examples
    ///
    /// ```
    /// use restbridge_http::query::{KeyPath, KeySegment};
    ///
    /// let path = KeyPath::parse("a[b][]").unwrap();
    /// assert_eq!(path.base, "a");
    /// assert_eq!(
    ///     path.segments,
    ///     vec![KeySegment::Key("b".into()), KeySegment::Array],
    /// );
    /// assert!(KeyPath::parse("a[b").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (base, mut rest) = match raw.find(['[', ']']) {
            Some(pos) => raw.split_at(pos),
            None => (raw, ""),
        };
        if base.is_empty() && !rest.is_empty() {
            return None;
        }

        let mut segments = Vec::new();
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let name = &inner[..close];
            if name.contains('[') {
                return None;
            }
            segments.push(if name.is_empty() {
                KeySegment::Array
            } else {
                KeySegment::Key(name.to_owned())
            });
            rest = &inner[close + 1..];
        }

        Some(Self {
            base: base.to_owned(),
            segments,
        })
    }
}

/// Normalize a raw multi-value query map.
///
/// Keys are processed in sorted order, so when two keys write the same
/// scalar location the lexicographically later key wins. Objects written by
/// different keys are merged.
pub fn normalize_query(raw: &BTreeMap<String, Vec<String>>) -> Result<Query, BridgeError> {
    let mut query = Query::new();
    for (key, values) in raw {
        let path = KeyPath::parse(key).ok_or_else(|| BridgeError::malformed_query(key))?;
        if let Some(value) = normalize_entry(&path.segments, values) {
            merge_into(&mut query, path.base, value);
        }
    }
    Ok(query)
}

/// Build the value for one key. `None` means the value is undefined.
fn normalize_entry(segments: &[KeySegment], values: &[String]) -> Option<Value> {
    match segments.split_first() {
        None | Some((KeySegment::Array, [])) => coerce_values(values),
        Some((KeySegment::Key(name), rest)) => {
            let mut nested = Query::new();
            if let Some(value) = normalize_entry(rest, values) {
                nested.insert(name.clone(), value);
            }
            Some(Value::Object(nested))
        }
        Some((KeySegment::Array, rest)) => normalize_entry(rest, values),
    }
}

/// A single value is a scalar; several values stay a list.
fn coerce_values(values: &[String]) -> Option<Value> {
    match values {
        [single] => coerce_scalar(single),
        many => Some(Value::Array(
            many.iter()
                .map(|v| coerce_scalar(v).unwrap_or(Value::Null))
                .collect(),
        )),
    }
}

fn merge_into(target: &mut Query, key: String, value: Value) {
    if let Value::Object(incoming) = value {
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            for (k, v) in incoming {
                merge_into(existing, k, v);
            }
            return;
        }
        target.insert(key, Value::Object(incoming));
    } else {
        target.insert(key, value);
    }
}

/// Coerce a raw query string value.
///
/// Returns `None` for `"undefined"`, which removes the key from the query.
///
/// # Examples
///
/// ```
/// use restbridge_http::query::coerce_scalar;
/// use serde_json::json;
///
/// assert_eq!(coerce_scalar("true"), Some(json!(true)));
/// assert_eq!(coerce_scalar("null"), Some(json!(null)));
/// assert_eq!(coerce_scalar("42"), Some(json!(42)));
/// assert_eq!(coerce_scalar("abc"), Some(json!("abc")));
/// assert_eq!(coerce_scalar("undefined"), None);
/// ```
#[must_use]
pub fn coerce_scalar(raw: &str) -> Option<Value> {
    let value = match raw {
        "" => Value::String(String::new()),
        "null" => Value::Null,
        "undefined" => return None,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => parse_number(raw).map_or_else(|| Value::String(raw.to_owned()), Value::Number),
    };
    Some(value)
}
