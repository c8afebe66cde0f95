//! Primary document store trait.
//!
//! This module defines [`DocumentStore`], the CRUD surface over the primary
//! store's collections. Documents travel as `serde_json::Value`; typed views
//! live in [`crate::entities`]. Every write validates against the collection
//! schema before it reaches the backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::id::EntityId;

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// A single condition on a document field.
///
/// Field paths may be dotted (`"answers.question"`) and match any element
/// when the path crosses an array.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Exact equality.
    Eq(String, Value),
    /// Case-insensitive substring match, the `$regex`/`i` idiom.
    Contains(String, String),
    /// Membership in a set of values.
    AnyOf(String, Vec<Value>),
    /// Disjunction: at least one inner condition holds.
    Or(Vec<Filter>),
}

/// Sort direction for [`FindOptions::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Windowing and ordering for a find.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Number of documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Sort field and direction.
    pub sort: Option<(String, SortOrder)>,
}

impl FindOptions {
    /// A window starting at `skip`, `limit` wide.
    pub fn window(skip: u64, limit: u64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            sort: None,
        }
    }

    /// Adds a sort to the options.
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }
}

/// CRUD over the primary store.
///
/// Backends validate writes against [`crate::schema`] and assign `_id` on
/// insert when the document carries none.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Inserts a document, applying schema defaults, and returns it with
    /// its assigned `_id`.
    async fn insert(&self, collection: &str, document: Value) -> StorageResult<Value>;

    /// Fetches one document by id. `Ok(None)` when absent.
    async fn find_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>>;

    /// Fetches the first document matching all filters.
    async fn find_one(&self, collection: &str, filters: &[Filter]) -> StorageResult<Option<Value>>;

    /// Applies a partial update to a document and returns the updated
    /// document, or `Ok(None)` when no document has that id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        patch: Value,
    ) -> StorageResult<Option<Value>>;

    /// Deletes a document by id. Returns the deleted document, or
    /// `Ok(None)` when absent.
    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>>;

    /// Deletes every document matching all filters and returns the count.
    async fn delete_many(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64>;

    /// Fetches documents matching all filters, windowed by `options`.
    async fn find(
        &self,
        collection: &str,
        filters: &[Filter],
        options: &FindOptions,
    ) -> StorageResult<Vec<Value>>;

    /// Counts documents matching all filters.
    async fn count(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64>;
}

/// Reads the `_id` string out of a stored document.
pub fn document_id(document: &Value) -> Option<&str> {
    document.get("_id").and_then(Value::as_str)
}

/// Stamps `createdAt`/`updatedAt` on a write, for collections that declare
/// them. Mirrors the timestamp bookkeeping an ODM would do for us.
pub(crate) fn stamp_timestamps(collection: &str, doc: &mut Value, insert: bool) {
    let Some(schema) = crate::schema::schema_for(collection) else {
        return;
    };
    let Some(obj) = doc.as_object_mut() else {
        return;
    };
    let now = chrono::Utc::now().to_rfc3339();
    if insert
        && schema.fields.iter().any(|f| f.name == "createdAt")
        && !obj.contains_key("createdAt")
    {
        obj.insert("createdAt".to_string(), Value::String(now.clone()));
    }
    if schema.fields.iter().any(|f| f.name == "updatedAt") {
        obj.insert("updatedAt".to_string(), Value::String(now));
    }
}

/// Runs the collection schema over a write, when the collection has one.
pub(crate) fn validate_write(
    collection: &str,
    doc: &Value,
    mode: crate::schema::ValidateMode,
) -> StorageResult<()> {
    if let Some(schema) = crate::schema::schema_for(collection) {
        crate::schema::validate(schema, doc, mode)?;
    }
    Ok(())
}
