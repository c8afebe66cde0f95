//! Dual-write mirror synchronizer.
//!
//! After a primary-store mutation commits, the mutating operation calls
//! back here to realign the search index. The entity is re-fetched with
//! its parent chain resolved (Quiz -> Topic -> Subject), projected to a
//! fixed denormalized document, and written under the primary record's id
//! with synchronous visibility.
//!
//! There is no rollback: if the index write fails the primary write stays
//! committed and the error propagates to the original caller, leaving the
//! mirror stale until the next successful mutation on the same entity.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{StorageError, StorageResult};
use crate::id::EntityId;
use crate::index::SearchIndex;
use crate::schema::DEFAULT_SUBJECT_IMAGE;
use crate::store::DocumentStore;

/// Search index holding subject mirrors.
pub const SUBJECT_INDEX: &str = "subject";
/// Search index holding topic mirrors.
pub const TOPIC_INDEX: &str = "topic";
/// Search index holding quiz mirrors.
pub const QUIZ_INDEX: &str = "quiz";

/// Keeps search-index documents aligned with primary-store records for the
/// searchable entities (Subject, Topic, Quiz).
#[derive(Debug)]
pub struct MirrorSync<S, I> {
    store: Arc<S>,
    index: Arc<I>,
}

impl<S, I> Clone for MirrorSync<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
        }
    }
}

fn str_or_empty(doc: &Value, field: &str) -> Value {
    match doc.get(field) {
        Some(Value::String(s)) => Value::from(s.clone()),
        _ => Value::from(""),
    }
}

impl<S: DocumentStore, I: SearchIndex> MirrorSync<S, I> {
    /// Pairs a primary store with its search index.
    pub fn new(store: Arc<S>, index: Arc<I>) -> Self {
        Self { store, index }
    }

    async fn fetch(&self, collection: &str, entity: &str, id: &EntityId) -> StorageResult<Value> {
        self.store
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| StorageError::not_found(entity, id.as_str()))
    }

    fn subject_projection(subject: &Value) -> Value {
        json!({
            "name": str_or_empty(subject, "name"),
            "description": str_or_empty(subject, "description"),
            "maxTopics": subject.get("maxTopics").cloned().unwrap_or(json!(20)),
            "image": match subject.get("image") {
                Some(Value::String(s)) if !s.is_empty() => Value::from(s.clone()),
                _ => Value::from(DEFAULT_SUBJECT_IMAGE),
            },
        })
    }

    fn embedded_subject(subject: &Value) -> Value {
        let mut embedded = Self::subject_projection(subject);
        if let (Some(obj), Some(id)) = (
            embedded.as_object_mut(),
            subject.get("_id").and_then(Value::as_str),
        ) {
            obj.insert("_id".to_string(), Value::from(id));
        }
        embedded
    }

    /// Re-syncs the subject `id` into the search index.
    pub async fn upsert_subject(&self, id: &EntityId) -> StorageResult<()> {
        let subject = self.fetch("subjects", "Subject", id).await?;
        let document = Self::subject_projection(&subject);
        self.index.put(SUBJECT_INDEX, id.as_str(), document).await?;
        info!(%id, "subject synced to search index");
        Ok(())
    }

    /// Re-syncs the topic `id`, embedding its subject's current fields.
    pub async fn upsert_topic(&self, id: &EntityId) -> StorageResult<()> {
        let topic = self.fetch("topics", "Topic", id).await?;
        let subject = match topic.get("subject").and_then(Value::as_str) {
            Some(subject_id) => match subject_id.parse::<EntityId>() {
                Ok(subject_id) => self.store.find_by_id("subjects", &subject_id).await?,
                Err(_) => None,
            },
            None => None,
        };

        let document = json!({
            "name": str_or_empty(&topic, "name"),
            "description": str_or_empty(&topic, "description"),
            "subject": match &subject {
                Some(subject) => json!({
                    "_id": subject.get("_id").cloned().unwrap_or(Value::Null),
                    "name": str_or_empty(subject, "name"),
                    "description": str_or_empty(subject, "description"),
                    "image": str_or_empty(subject, "image"),
                }),
                None => Value::Null,
            },
        });
        self.index.put(TOPIC_INDEX, id.as_str(), document).await?;
        info!(%id, "topic synced to search index");
        Ok(())
    }

    /// Re-syncs the quiz `id`, embedding its topic and that topic's subject.
    pub async fn upsert_quiz(&self, id: &EntityId) -> StorageResult<()> {
        let quiz = self.fetch("quizzes", "Quiz", id).await?;

        let topic = match quiz.get("topic").and_then(Value::as_str) {
            Some(topic_id) => match topic_id.parse::<EntityId>() {
                Ok(topic_id) => self.store.find_by_id("topics", &topic_id).await?,
                Err(_) => None,
            },
            None => None,
        };
        let subject = match topic
            .as_ref()
            .and_then(|t| t.get("subject"))
            .and_then(Value::as_str)
        {
            Some(subject_id) => match subject_id.parse::<EntityId>() {
                Ok(subject_id) => self.store.find_by_id("subjects", &subject_id).await?,
                Err(_) => None,
            },
            None => None,
        };

        let document = json!({
            "title": str_or_empty(&quiz, "title"),
            "description": str_or_empty(&quiz, "description"),
            "duration": quiz.get("duration").cloned().unwrap_or(Value::Null),
            "questionCount": quiz.get("questionCount").cloned().unwrap_or(json!(0)),
            "uniqueUserCount": quiz.get("uniqueUserCount").cloned().unwrap_or(json!(0)),
            "favoriteCount": quiz.get("favoriteCount").cloned().unwrap_or(json!(0)),
            "lastAttemptAt": quiz.get("lastAttemptAt").cloned().unwrap_or(Value::Null),
            "topic": match &topic {
                Some(topic) => json!({
                    "_id": topic.get("_id").cloned().unwrap_or(Value::Null),
                    "name": str_or_empty(topic, "name"),
                    "description": str_or_empty(topic, "description"),
                    "subject": match &subject {
                        Some(subject) => Self::embedded_subject(subject),
                        None => Value::Null,
                    },
                }),
                None => Value::Null,
            },
        });
        self.index.put(QUIZ_INDEX, id.as_str(), document).await?;
        info!(%id, "quiz synced to search index");
        Ok(())
    }

    /// Removes the mirror document for a deleted primary record.
    ///
    /// A missing mirror surfaces as
    /// [`crate::error::IndexError::NotFoundInIndex`]; callers may treat it
    /// as non-fatal since the end state is what the delete wanted.
    pub async fn delete_mirror(&self, index: &str, entity: &str, id: &EntityId) -> StorageResult<()> {
        match self.index.remove(index, entity, id.as_str()).await {
            Ok(()) => {
                info!(%id, index, "mirror document removed");
                Ok(())
            }
            Err(e) => {
                warn!(%id, index, error = %e, "mirror delete failed");
                Err(e.into())
            }
        }
    }
}
