//! Resource identifiers taken from the trailing path segment.
//!
//! Path segments are strings, but services usually key records by number.
//! A segment that parses fully as a number therefore becomes a numeric id.
//! This is lossy: `/users/42` can never address a record whose id is the
//! string `"42"`. Such ids must be quoted in the path (`/users/"42"` or
//! `/users/'42'`), and exactly one layer of quotes is stripped.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Matching quote pairs accepted around a string identifier.
const QUOTE_PAIRS: [(char, char); 4] = [
    ('"', '"'),
    ('\'', '\''),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
];

/// Largest integer a float can hold without losing precision (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A resource identifier: numeric or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// A numeric id, e.g. from `/users/7`.
    Number(Number),
    /// A string id, e.g. from `/users/abc` or `/users/"7"`.
    String(String),
}

impl ResourceId {
    /// Coerce a decoded path segment into an identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use restbridge_model::ResourceId;
    ///
    /// assert_eq!(ResourceId::from_segment("7"), ResourceId::from(7));
    /// assert_eq!(ResourceId::from_segment("\"7\""), ResourceId::from("7"));
    /// assert_eq!(ResourceId::from_segment("abc"), ResourceId::from("abc"));
    /// ```
    #[must_use]
    pub fn from_segment(segment: &str) -> Self {
        if let Some(n) = parse_number(segment) {
            return Self::Number(n);
        }
        match strip_quotes(segment) {
            Some(inner) => Self::String(inner.to_owned()),
            None => Self::String(segment.to_owned()),
        }
    }

    /// The id as an `i64`, if it is an integral number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            Self::String(_) => None,
        }
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Parse a string that is entirely a number.
///
/// Integers stay integral. Other finite values become floats, collapsing to
/// an integer when they have no fractional part and fit in 2^53. Empty
/// strings and non-finite spellings (`NaN`, `inf`) are not numbers.
#[must_use]
pub fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        let whole = f as i64;
        return Some(Number::from(whole));
    }
    Number::from_f64(f)
}

/// Strip exactly one matching pair of quotes, if present.
fn strip_quotes(s: &str) -> Option<&str> {
    QUOTE_PAIRS.iter().find_map(|&(open, close)| {
        s.strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
    })
}
