//! Query filtering, sorting and paging for in-memory records.
//!
//! Reserved parameters start with `$`:
//!
//! | Parameter | Example | Effect |
//! |-----------|---------|--------|
//! | `$limit` | `$limit=10` | at most 10 records |
//! | `$skip` | `$skip=20` | drop the first 20 records |
//! | `$sort` | `$sort[age]=-1` | order by field, `1` ascending, `-1` descending |
//! | `$select` | `$select[]=name` | keep only the listed fields |
//!
//! Every other key filters on a record field. A scalar value tests
//! equality, a list is shorthand for `$in`, and an object holds
//! comparison operators (`$in`, `$nin`, `$ne`, `$lt`, `$lte`, `$gt`, `$gte`).

use std::cmp::Ordering;

use restbridge_http::Query;
use serde_json::{Map, Value};

use crate::error::MemoryError;

/// Sort direction for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// `1`
    Ascending,
    /// `-1`
    Descending,
}

/// A query split into filters and paging controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindParams {
    /// Field filters.
    pub filters: Map<String, Value>,
    /// Maximum number of records returned.
    pub limit: Option<usize>,
    /// Number of leading records dropped.
    pub skip: usize,
    /// Sort keys in priority order.
    pub sort: Vec<(String, SortOrder)>,
    /// Fields to keep, if restricted.
    pub select: Option<Vec<String>>,
}

impl FindParams {
    /// Split a normalized query into filters and paging controls.
    pub fn from_query(query: &Query) -> Result<Self, MemoryError> {
        let mut params = Self::default();
        for (key, value) in query {
            match key.as_str() {
                "$limit" => params.limit = Some(parse_count(key, value)?),
                "$skip" => params.skip = parse_count(key, value)?,
                "$sort" => params.sort = parse_sort(value)?,
                "$select" => params.select = Some(parse_select(value)?),
                k if k.starts_with('$') => {
                    return Err(MemoryError::invalid_query(k, "unsupported parameter"));
                }
                _ => {
                    params.filters.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(params)
    }

    /// Whether `record` passes every filter.
    pub fn matches(&self, record: &Map<String, Value>) -> Result<bool, MemoryError> {
        for (field, expected) in &self.filters {
            let actual = record.get(field).unwrap_or(&Value::Null);
            if !field_matches(field, actual, expected)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sort, skip and limit `records` in place.
    pub fn apply_paging(&self, records: &mut Vec<Map<String, Value>>) {
        if !self.sort.is_empty() {
            records.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|(field, order)| {
                        let ord = compare_values(
                            a.get(field).unwrap_or(&Value::Null),
                            b.get(field).unwrap_or(&Value::Null),
                        );
                        match order {
                            SortOrder::Ascending => ord,
                            SortOrder::Descending => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let skip = self.skip.min(records.len());
        records.drain(..skip);
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
    }

    /// Project `record` onto the selected fields. `id_field` is always kept.
    #[must_use]
    pub fn project(&self, record: Map<String, Value>, id_field: &str) -> Map<String, Value> {
        let Some(select) = &self.select else {
            return record;
        };
        record
            .into_iter()
            .filter(|(k, _)| k == id_field || select.iter().any(|s| s == k))
            .collect()
    }
}

fn parse_count(param: &str, value: &Value) -> Result<usize, MemoryError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| MemoryError::invalid_query(param, "expected a non-negative integer"))
}

fn parse_sort(value: &Value) -> Result<Vec<(String, SortOrder)>, MemoryError> {
    let Value::Object(fields) = value else {
        return Err(MemoryError::invalid_query("$sort", "expected $sort[field]=1|-1"));
    };
    fields
        .iter()
        .map(|(field, dir)| match dir.as_i64() {
            Some(1) => Ok((field.clone(), SortOrder::Ascending)),
            Some(-1) => Ok((field.clone(), SortOrder::Descending)),
            _ => Err(MemoryError::invalid_query(
                format!("$sort[{field}]"),
                "expected 1 or -1",
            )),
        })
        .collect()
}

fn parse_select(value: &Value) -> Result<Vec<String>, MemoryError> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| MemoryError::invalid_query("$select", "expected field names"))
            })
            .collect(),
        _ => Err(MemoryError::invalid_query("$select", "expected field names")),
    }
}

fn field_matches(field: &str, actual: &Value, expected: &Value) -> Result<bool, MemoryError> {
    match expected {
        Value::Array(options) => Ok(options.iter().any(|o| values_equal(actual, o))),
        Value::Object(ops) => {
            for (op, operand) in ops {
                if !operator_matches(field, op, actual, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        scalar => Ok(values_equal(actual, scalar)),
    }
}

fn operator_matches(
    field: &str,
    op: &str,
    actual: &Value,
    operand: &Value,
) -> Result<bool, MemoryError> {
    let in_list = |operand: &Value| match operand {
        Value::Array(options) => options.iter().any(|o| values_equal(actual, o)),
        single => values_equal(actual, single),
    };
    let result = match op {
        "$in" => in_list(operand),
        "$nin" => !in_list(operand),
        "$ne" => !values_equal(actual, operand),
        "$lt" => comparable(actual, operand) && compare_values(actual, operand).is_lt(),
        "$lte" => comparable(actual, operand) && compare_values(actual, operand).is_le(),
        "$gt" => comparable(actual, operand) && compare_values(actual, operand).is_gt(),
        "$gte" => comparable(actual, operand) && compare_values(actual, operand).is_ge(),
        other => {
            return Err(MemoryError::invalid_query(
                format!("{field}[{other}]"),
                "unsupported operator",
            ));
        }
    };
    Ok(result)
}

/// Equality with numbers compared by value, so `1` equals `1.0`.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn comparable(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b) && !a.is_null()
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: values of different types order by type
/// (`null < bool < number < string < array < object`), numbers by value,
/// strings by bytes. Arrays and objects of the same type compare equal.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
