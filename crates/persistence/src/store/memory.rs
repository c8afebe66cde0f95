//! In-memory document store.
//!
//! The default backend: a map of collections guarded by a [`parking_lot`]
//! lock. Used by the test suite and by local development without a running
//! database. Matching semantics follow the live backend, including
//! dotted-path lookups through arrays.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{StorageResult, ValidationError};
use crate::id::EntityId;
use crate::schema::{self, ValidateMode};
use crate::store::{validate_write, DocumentStore, Filter, FindOptions, SortOrder};

/// Heap-backed [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves a dotted field path, descending into array elements.
fn lookup<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![document];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(v) = map.get(segment) {
                        next.push(v);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(v) = item.get(segment) {
                            next.push(v);
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

fn matches(document: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(path, expected) => lookup(document, path).iter().any(|v| *v == expected),
        Filter::Contains(path, needle) => {
            let needle = needle.to_lowercase();
            lookup(document, path)
                .iter()
                .filter_map(|v| v.as_str())
                .any(|s| s.to_lowercase().contains(&needle))
        }
        Filter::AnyOf(path, allowed) => lookup(document, path)
            .iter()
            .any(|v| allowed.iter().any(|a| a == *v)),
        Filter::Or(inner) => inner.iter().any(|f| matches(document, f)),
    }
}

fn matches_all(document: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(document, f))
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, mut document: Value) -> StorageResult<Value> {
        if let Some(schema) = schema::schema_for(collection) {
            schema::apply_defaults(schema, &mut document);
        }
        super::stamp_timestamps(collection, &mut document, true);
        validate_write(collection, &document, ValidateMode::Insert)?;

        let obj = document
            .as_object_mut()
            .ok_or_else(|| ValidationError::InvalidField {
                field: collection.to_string(),
                message: "document must be a JSON object".to_string(),
            })?;
        obj.entry("_id".to_string())
            .or_insert_with(|| Value::from(EntityId::generate().to_string()));

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|d| d.get("_id").and_then(Value::as_str) == Some(id.as_str()))
                .cloned()
        }))
    }

    async fn find_one(&self, collection: &str, filters: &[Filter]) -> StorageResult<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches_all(d, filters)).cloned()))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        mut patch: Value,
    ) -> StorageResult<Option<Value>> {
        validate_write(collection, &patch, ValidateMode::Update)?;
        super::stamp_timestamps(collection, &mut patch, false);
        let fields = patch
            .as_object()
            .ok_or_else(|| ValidationError::InvalidField {
                field: collection.to_string(),
                message: "patch must be a JSON object".to_string(),
            })?
            .clone();

        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(doc) = docs
            .iter_mut()
            .find(|d| d.get("_id").and_then(Value::as_str) == Some(id.as_str()))
        else {
            return Ok(None);
        };
        if let Some(obj) = doc.as_object_mut() {
            for (key, value) in fields {
                if key != "_id" {
                    obj.insert(key, value);
                }
            }
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let position = docs
            .iter()
            .position(|d| d.get("_id").and_then(Value::as_str) == Some(id.as_str()));
        Ok(position.map(|i| docs.remove(i)))
    }

    async fn delete_many(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches_all(d, filters));
        Ok((before - docs.len()) as u64)
    }

    async fn find(
        &self,
        collection: &str,
        filters: &[Filter],
        options: &FindOptions,
    ) -> StorageResult<Vec<Value>> {
        let collections = self.collections.read();
        let mut hits: Vec<Value> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_all(d, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, order)) = &options.sort {
            hits.sort_by(|a, b| {
                let ord = compare(
                    a.get(field).unwrap_or(&Value::Null),
                    b.get(field).unwrap_or(&Value::Null),
                );
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let hits = hits.into_iter().skip(skip);
        Ok(match options.limit {
            Some(limit) => hits.take(limit as usize).collect(),
            None => hits.collect(),
        })
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches_all(d, filters)).count() as u64)
            .unwrap_or(0))
    }
}
