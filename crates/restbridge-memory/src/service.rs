//! In-memory record store implementing the full service contract.
//!
//! ```text
//! DashMap<IdKey, StoredRecord { seq, data }>
//! ```
//!
//! Records are keyed by the string form of their id, so the number `7` and
//! the string `"7"` address the same record. Numbers are keyed in canonical
//! form: `1.0` and `1` are one key. `seq` preserves insertion order
//! for `find`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use restbridge_http::{Query, Service, ServiceResult};
use restbridge_model::{ResourceId, ServiceMethod, parse_number};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::MemoryError;
use crate::filter::FindParams;

type Record = Map<String, Value>;

#[derive(Debug, Clone)]
struct StoredRecord {
    seq: u64,
    data: Record,
}

/// A service that keeps its records in memory.
///
/// Ids are auto-incrementing integers starting at 0 unless the created record
/// already carries one.
#[derive(Debug)]
pub struct MemoryService {
    id_field: String,
    records: DashMap<String, StoredRecord>,
    next_id: AtomicU64,
    next_seq: AtomicU64,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new("id")
    }
}

impl MemoryService {
    /// Create an empty service using `id_field` as the record id.
    #[must_use]
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            records: DashMap::new(),
            next_id: AtomicU64::new(0),
            next_seq: AtomicU64::new(0),
        }
    }

    /// The record id field name.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store one record, assigning an id if it has none.
    pub fn insert(&self, data: Value) -> Result<Value, MemoryError> {
        self.validate(&data)?;
        let Value::Object(mut record) = data else {
            return Err(invalid_shape());
        };

        let key = match record.get(&self.id_field).and_then(id_key) {
            Some(key) => key,
            None => {
                let id = self.allocate_id();
                record.insert(self.id_field.clone(), Value::from(id));
                id.to_string()
            }
        };

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        debug!(id = %key, "storing record");
        self.records.insert(
            key,
            StoredRecord {
                seq,
                data: record.clone(),
            },
        );
        Ok(Value::Object(record))
    }

    /// Check that `data` could be stored: an object whose id, if present,
    /// is a number or a string.
    fn validate(&self, data: &Value) -> Result<(), MemoryError> {
        let Value::Object(record) = data else {
            return Err(invalid_shape());
        };
        match record.get(&self.id_field) {
            Some(id) if id_key(id).is_none() => Err(MemoryError::InvalidData(format!(
                "'{}' must be a number or a string",
                self.id_field
            ))),
            _ => Ok(()),
        }
    }

    fn allocate_id(&self) -> u64 {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if !self.records.contains_key(&id.to_string()) {
                return id;
            }
        }
    }

    fn lookup(&self, id: &ResourceId) -> Result<Record, MemoryError> {
        self.records
            .get(&resource_key(id))
            .map(|r| r.data.clone())
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))
    }

    /// Records in insertion order that pass the query filters.
    fn matching(&self, params: &FindParams) -> Result<Vec<(String, Record)>, MemoryError> {
        let mut all: Vec<(u64, String, Record)> = self
            .records
            .iter()
            .map(|e| (e.seq, e.key().clone(), e.data.clone()))
            .collect();
        all.sort_by_key(|(seq, _, _)| *seq);

        let mut matched = Vec::with_capacity(all.len());
        for (_, key, record) in all {
            if params.matches(&record)? {
                matched.push((key, record));
            }
        }
        Ok(matched)
    }

    fn replace(&self, id: &ResourceId, data: Value, merge: bool) -> Result<Value, MemoryError> {
        let Value::Object(data) = data else {
            return Err(MemoryError::InvalidData("Data must be an object".into()));
        };

        let mut entry = self
            .records
            .get_mut(&resource_key(id))
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        let stored_id = entry
            .data
            .get(&self.id_field)
            .cloned()
            .unwrap_or_else(|| id.to_value());

        let mut record = if merge { entry.data.clone() } else { Map::new() };
        record.extend(data);
        record.insert(self.id_field.clone(), stored_id);
        entry.data = record.clone();
        Ok(Value::Object(record))
    }
}

fn invalid_shape() -> MemoryError {
    MemoryError::InvalidData("Data must be an object or an array of objects".into())
}

/// The store key of an id value.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(number_key(n)),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// The store key of a resolved resource id.
fn resource_key(id: &ResourceId) -> String {
    match id {
        ResourceId::Number(n) => number_key(n),
        ResourceId::String(s) => s.clone(),
    }
}

fn number_key(n: &Number) -> String {
    let text = n.to_string();
    parse_number(&text).map_or(text, |canonical| canonical.to_string())
}

#[async_trait]
impl Service for MemoryService {
    fn supports(&self, _method: ServiceMethod) -> bool {
        true
    }

    async fn find(&self, query: Query) -> ServiceResult {
        let params = FindParams::from_query(&query)?;
        let mut records: Vec<Record> = self
            .matching(&params)?
            .into_iter()
            .map(|(_, r)| r)
            .collect();
        params.apply_paging(&mut records);
        Ok(Value::Array(
            records
                .into_iter()
                .map(|r| Value::Object(params.project(r, &self.id_field)))
                .collect(),
        ))
    }

    async fn get(&self, id: ResourceId, query: Query) -> ServiceResult {
        let params = FindParams::from_query(&query)?;
        let record = self.lookup(&id)?;
        if !params.matches(&record)? {
            return Err(MemoryError::NotFound(id.to_string()).into());
        }
        Ok(Value::Object(params.project(record, &self.id_field)))
    }

    async fn create(&self, data: Value, _query: Query) -> ServiceResult {
        match data {
            Value::Array(items) => {
                // All or nothing: a bad item must not leave earlier ones stored.
                for item in &items {
                    self.validate(item)?;
                }
                let created = items
                    .into_iter()
                    .map(|item| self.insert(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(created))
            }
            single => Ok(self.insert(single)?),
        }
    }

    async fn update(&self, id: ResourceId, data: Value, _query: Query) -> ServiceResult {
        Ok(self.replace(&id, data, false)?)
    }

    async fn patch(&self, id: ResourceId, data: Value, _query: Query) -> ServiceResult {
        Ok(self.replace(&id, data, true)?)
    }

    async fn remove(&self, id: Option<ResourceId>, query: Query) -> ServiceResult {
        let params = FindParams::from_query(&query)?;
        let Some(id) = id else {
            let removed: Vec<Value> = self
                .matching(&params)?
                .into_iter()
                .filter_map(|(key, _)| self.records.remove(&key))
                .map(|(_, r)| Value::Object(r.data))
                .collect();
            debug!(count = removed.len(), "removed records");
            return Ok(Value::Array(removed));
        };

        let record = self.lookup(&id)?;
        if !params.matches(&record)? {
            return Err(MemoryError::NotFound(id.to_string()).into());
        }
        self.records.remove(&resource_key(&id));
        Ok(Value::Object(record))
    }
}
