//! Request handlers, one module per entity.

use serde_json::Value;

use scifun_persistence::id::EntityId;
use scifun_persistence::store::DocumentStore;

use crate::error::{ApiError, ApiResult};

pub mod question;
pub mod quiz;
pub mod result;
pub mod subject;
pub mod topic;
pub mod user;
pub mod video_lesson;

/// Parses a path id, replacing the generic parse error with the entity's
/// own message.
pub(crate) fn parse_id(raw: &str, invalid_message: &str) -> ApiResult<EntityId> {
    raw.parse::<EntityId>()
        .map_err(|_| ApiError::msg(invalid_message))
}

/// Replaces a reference field with the referenced document, when it exists.
///
/// Mirrors read-side reference population: an unresolvable reference is
/// left as the bare id rather than failing the request.
pub(crate) async fn populate<S: DocumentStore>(
    store: &S,
    document: &mut Value,
    field: &str,
    collection: &str,
) -> ApiResult<()> {
    let Some(id) = document
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<EntityId>().ok())
    else {
        return Ok(());
    };
    if let Some(parent) = store.find_by_id(collection, &id).await? {
        document[field] = parent;
    }
    Ok(())
}

/// Strips credential and verification bookkeeping fields from a user
/// document before it leaves the API.
pub(crate) fn strip_user_secrets(document: &mut Value) {
    if let Some(obj) = document.as_object_mut() {
        obj.remove("password");
        obj.remove("otp");
        obj.remove("otpExpires");
    }
}
