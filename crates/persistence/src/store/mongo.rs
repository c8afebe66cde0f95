//! MongoDB document store.
//!
//! Live [`DocumentStore`] backend over a MongoDB database. `_id` fields are
//! stored as native ObjectIds and exposed as their 24-hex string form, so
//! documents look the same regardless of backend.

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde_json::Value;
use tracing::info;

use crate::error::{BackendError, StorageResult, ValidationError};
use crate::id::EntityId;
use crate::schema::{self, ValidateMode};
use crate::store::{validate_write, DocumentStore, Filter, FindOptions, SortOrder};

/// [`DocumentStore`] backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connects to `uri` and selects `database`.
    ///
    /// Issues a `ping` so misconfiguration fails at startup rather than on
    /// the first request.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, BackendError> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(connection_failed)?;
        let client = Client::with_options(options).map_err(connection_failed)?;
        let database = client.database(database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_failed)?;
        info!(database = %database.name(), "connected to MongoDB");
        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

fn connection_failed(e: mongodb::error::Error) -> BackendError {
    BackendError::ConnectionFailed {
        backend_name: "mongodb".to_string(),
        message: e.to_string(),
    }
}

fn internal(e: mongodb::error::Error) -> BackendError {
    BackendError::Internal {
        backend_name: "mongodb".to_string(),
        message: e.to_string(),
    }
}

fn id_filter(id: &EntityId) -> Result<Document, ValidationError> {
    let oid = ObjectId::parse_str(id.as_str()).map_err(|_| ValidationError::InvalidIdentifier {
        value: id.to_string(),
    })?;
    Ok(doc! { "_id": oid })
}

fn json_to_bson(field: &str, value: Value) -> Result<Bson, ValidationError> {
    // Reference fields stay hex strings; only `_id` becomes an ObjectId.
    if field == "_id" {
        if let Some(s) = value.as_str() {
            let oid =
                ObjectId::parse_str(s).map_err(|_| ValidationError::InvalidIdentifier {
                    value: s.to_string(),
                })?;
            return Ok(Bson::ObjectId(oid));
        }
    }
    Bson::try_from(value).map_err(|e| ValidationError::InvalidField {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn json_to_document(value: Value) -> Result<Document, ValidationError> {
    let obj = value
        .as_object()
        .cloned()
        .ok_or_else(|| ValidationError::InvalidField {
            field: "_root".to_string(),
            message: "document must be a JSON object".to_string(),
        })?;
    let mut document = Document::new();
    for (key, v) in obj {
        let bson = json_to_bson(&key, v)?;
        document.insert(key, bson);
    }
    Ok(document)
}

fn bson_to_json(bson: Bson) -> Value {
    match bson {
        Bson::ObjectId(oid) => Value::from(oid.to_hex()),
        Bson::DateTime(dt) => Value::from(dt.try_to_rfc3339_string().unwrap_or_default()),
        other => other.into_relaxed_extjson(),
    }
}

fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(k, v)| (k, bson_to_json(v)))
            .collect(),
    )
}

fn filters_to_document(filters: &[Filter]) -> Result<Document, ValidationError> {
    let mut query = Document::new();
    for filter in filters {
        match filter {
            Filter::Eq(path, value) => {
                query.insert(path.clone(), json_to_bson(path, value.clone())?);
            }
            Filter::Contains(path, needle) => {
                query.insert(
                    path.clone(),
                    doc! { "$regex": regex_escape(needle), "$options": "i" },
                );
            }
            Filter::AnyOf(path, values) => {
                let items = values
                    .iter()
                    .map(|v| json_to_bson(path, v.clone()))
                    .collect::<Result<Vec<_>, _>>()?;
                query.insert(path.clone(), doc! { "$in": items });
            }
            Filter::Or(inner) => {
                let branches = inner
                    .iter()
                    .map(|f| filters_to_document(std::slice::from_ref(f)))
                    .collect::<Result<Vec<_>, _>>()?;
                query.insert("$or", branches);
            }
        }
    }
    Ok(query)
}

fn regex_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(&self, collection: &str, mut document: Value) -> StorageResult<Value> {
        if let Some(schema) = schema::schema_for(collection) {
            schema::apply_defaults(schema, &mut document);
        }
        super::stamp_timestamps(collection, &mut document, true);
        validate_write(collection, &document, ValidateMode::Insert)?;

        if let Some(obj) = document.as_object_mut() {
            obj.entry("_id".to_string())
                .or_insert_with(|| Value::from(EntityId::generate().to_string()));
        }
        let bson_doc = json_to_document(document.clone())?;
        self.collection(collection)
            .insert_one(bson_doc)
            .await
            .map_err(internal)?;
        Ok(document)
    }

    async fn find_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>> {
        let found = self
            .collection(collection)
            .find_one(id_filter(id)?)
            .await
            .map_err(internal)?;
        Ok(found.map(document_to_json))
    }

    async fn find_one(&self, collection: &str, filters: &[Filter]) -> StorageResult<Option<Value>> {
        let found = self
            .collection(collection)
            .find_one(filters_to_document(filters)?)
            .await
            .map_err(internal)?;
        Ok(found.map(document_to_json))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &EntityId,
        mut patch: Value,
    ) -> StorageResult<Option<Value>> {
        validate_write(collection, &patch, ValidateMode::Update)?;
        super::stamp_timestamps(collection, &mut patch, false);
        let mut set = json_to_document(patch)?;
        set.remove("_id");
        if set.is_empty() {
            return self.find_by_id(collection, id).await;
        }
        let updated = self
            .collection(collection)
            .find_one_and_update(id_filter(id)?, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(internal)?;
        Ok(updated.map(document_to_json))
    }

    async fn delete_by_id(&self, collection: &str, id: &EntityId) -> StorageResult<Option<Value>> {
        let deleted = self
            .collection(collection)
            .find_one_and_delete(id_filter(id)?)
            .await
            .map_err(internal)?;
        Ok(deleted.map(document_to_json))
    }

    async fn delete_many(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(filters_to_document(filters)?)
            .await
            .map_err(internal)?;
        Ok(result.deleted_count)
    }

    async fn find(
        &self,
        collection: &str,
        filters: &[Filter],
        options: &FindOptions,
    ) -> StorageResult<Vec<Value>> {
        use futures_util::TryStreamExt;

        let collection = self.collection(collection);
        let mut find = collection.find(filters_to_document(filters)?);
        if let Some(skip) = options.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = options.limit {
            find = find.limit(limit as i64);
        }
        if let Some((field, order)) = &options.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            find = find.sort(doc! { field.clone(): direction });
        }
        let documents: Vec<Document> = find
            .await
            .map_err(internal)?
            .try_collect()
            .await
            .map_err(internal)?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> StorageResult<u64> {
        self.collection(collection)
            .count_documents(filters_to_document(filters)?)
            .await
            .map_err(internal)
            .map_err(Into::into)
    }
}
