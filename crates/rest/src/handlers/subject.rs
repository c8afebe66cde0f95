//! Subject endpoints.
//!
//! Mutations write the primary record first, then re-sync the mirror; a
//! failed index write surfaces to the caller with the primary write
//! already committed. List reads go to the search index only.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::Subject;
use scifun_persistence::index::{SearchIndex, SearchQuery};
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::DocumentStore;
use scifun_persistence::sync::SUBJECT_INDEX;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::state::AppState;

/// Query parameters for `GET /subject/get-subjects`.
#[derive(Debug, Deserialize)]
pub struct SubjectListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
}

/// `POST /subject/create-subject`
pub async fn create_subject<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(body): Json<Value>,
) -> Envelope {
    let created: ApiResult<Value> = async {
        let subject = state.store().insert(Subject::COLLECTION, body).await?;
        let id = parse_id(
            subject["_id"].as_str().unwrap_or_default(),
            "ID subject không hợp lệ",
        )?;
        state.sync().upsert_subject(&id).await?;
        Ok(subject)
    }
    .await;

    match created {
        Ok(subject) => Envelope::ok("Tạo môn học thành công", subject),
        // create keeps the legacy prefixed error text
        Err(e) => Envelope::fail(format!("Error creating subject: {e}")),
    }
}

/// `PUT /subject/update-subject/:_id`
pub async fn update_subject<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID subject không hợp lệ")?;
    let updated = state
        .store()
        .update_by_id(Subject::COLLECTION, &id, body)
        .await?
        .ok_or_else(|| ApiError::msg("Subject không tồn tại"))?;
    state.sync().upsert_subject(&id).await?;
    Ok(Envelope::ok("Cập nhật môn học thành công", updated))
}

/// `DELETE /subject/delete-subject/:_id`
pub async fn delete_subject<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID subject không hợp lệ")?;
    let deleted = state
        .store()
        .delete_by_id(Subject::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Subject không tồn tại"))?;
    state.sync().delete_mirror(SUBJECT_INDEX, "Subject", &id).await?;
    Ok(Envelope::ok(
        "Xóa môn học thành công",
        serde_json::json!({ "message": "Xóa subject thành công", "subject": deleted }),
    ))
}

/// `GET /subject/get-subjects?page&limit&search`
pub async fn get_subjects<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<SubjectListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let search = SearchQuery::new(&["name^2", "description", "code"], &params)
        .with_text(query.search);
    let found = state.index().search(SUBJECT_INDEX, &search).await?;

    let documents: Vec<Value> = found.hits.into_iter().map(|h| h.into_document()).collect();
    let page = Page::from_window(documents, found.total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách môn học thành công",
        page.into_keyed("subjects"),
    ))
}

/// `GET /subject/get-subjectById/:_id`
pub async fn get_subject_by_id<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID môn học không hợp lệ")?;
    let subject = state
        .store()
        .find_by_id(Subject::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Subject không tồn tại"))?;
    Ok(Envelope::ok("Lấy chi tiết môn học thành công", subject))
}
