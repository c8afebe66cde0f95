//! SciFun Persistence Layer
//!
//! This crate provides the storage layer for the SciFun quiz platform: a
//! primary document store holding the canonical records and a search index
//! holding denormalized mirrors of the searchable entities, kept aligned
//! by a dual-write synchronizer.
//!
//! # Features
//!
//! - **Document store**: schema-validated CRUD over the platform's
//!   collections (subjects, topics, quizzes, questions, video lessons,
//!   submissions, results, users)
//! - **Search index**: fuzzy full-text search with parent filters and
//!   pagination, authoritative for all list/search reads
//! - **Mirror sync**: after every mutation of a searchable entity, the
//!   record is re-read with its parent chain resolved and projected into
//!   the index with synchronous visibility
//!
//! # Backend Features
//!
//! Live backends are opt-in so the crate builds and tests without running
//! services; the in-memory backends always compile:
//!
//! ```toml
//! [dependencies]
//! scifun-persistence = { version = "0.1", features = ["mongodb", "elasticsearch"] }
//! ```
//!
//! # Architecture
//!
//! - [`schema`] - collection field declarations and the generic validator
//! - [`entities`] - typed views over stored documents
//! - [`store`] - the [`store::DocumentStore`] trait and its backends
//! - [`index`] - the [`index::SearchIndex`] trait and its backends
//! - [`sync`] - the dual-write [`sync::MirrorSync`]
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scifun_persistence::store::{DocumentStore, MemoryStore};
//! use scifun_persistence::index::MemoryIndex;
//! use scifun_persistence::sync::MirrorSync;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), scifun_persistence::error::StorageError> {
//! let store = Arc::new(MemoryStore::new());
//! let index = Arc::new(MemoryIndex::new());
//! let sync = MirrorSync::new(Arc::clone(&store), Arc::clone(&index));
//!
//! let subject = store.insert("subjects", json!({"name": "Toán"})).await?;
//! let id = subject["_id"].as_str().unwrap_or_default().parse()?;
//! sync.upsert_subject(&id).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod entities;
pub mod error;
pub mod id;
pub mod index;
pub mod page;
pub mod schema;
pub mod store;
pub mod sync;

pub use entities::{Answer, Question, Quiz, QuizResult, Role, Subject, Submission, Topic, User, VideoLesson};
pub use error::{BackendError, IndexError, StorageError, StorageResult, ValidationError};
pub use id::EntityId;
pub use index::{SearchHit, SearchIndex, SearchPage, SearchQuery};
pub use page::{Page, PageParams};
pub use store::{DocumentStore, Filter, FindOptions, SortOrder};
pub use sync::MirrorSync;
