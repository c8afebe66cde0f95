//! Search index trait.
//!
//! This module defines [`SearchIndex`], the mirror side of the dual-write
//! pair. Documents are denormalized JSON built by [`crate::sync`]; queries
//! are expressed as [`SearchQuery`] and projected to the engine's DSL by
//! the live backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::IndexResult;

pub mod memory;
pub mod query;
#[cfg(feature = "elasticsearch")]
pub mod elastic;

pub use memory::{FailNext, MemoryIndex};
pub use query::SearchQuery;
#[cfg(feature = "elasticsearch")]
pub use elastic::{ElasticAuth, ElasticConfig, ElasticIndex};

/// One matching document.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Document id, equal to the primary record's id.
    pub id: String,
    /// The indexed document.
    pub source: Value,
}

impl SearchHit {
    /// The source with `_id` merged in, the shape list endpoints return.
    pub fn into_document(self) -> Value {
        let mut source = self.source;
        if let Some(obj) = source.as_object_mut() {
            obj.insert("_id".to_string(), Value::from(self.id));
        }
        source
    }
}

/// One window of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Matching documents, best first.
    pub hits: Vec<SearchHit>,
    /// Total matches across all windows.
    pub total: u64,
}

/// The secondary, query-optimized store.
///
/// Writes are visible to the next search as soon as the call returns; the
/// live backend asks the engine to wait for a refresh.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// A human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Creates or replaces the document `id` in `index`.
    async fn put(&self, index: &str, id: &str, document: Value) -> IndexResult<()>;

    /// Removes the document `id` from `index`.
    ///
    /// # Errors
    ///
    /// [`crate::error::IndexError::NotFoundInIndex`] when the index has no
    /// such document.
    async fn remove(&self, index: &str, entity: &str, id: &str) -> IndexResult<()>;

    /// Fetches one indexed document. `Ok(None)` when absent.
    async fn get(&self, index: &str, id: &str) -> IndexResult<Option<Value>>;

    /// Runs a query against `index`.
    async fn search(&self, index: &str, query: &SearchQuery) -> IndexResult<SearchPage>;

    /// Liveness probe, used at startup.
    async fn ping(&self) -> IndexResult<()>;
}
