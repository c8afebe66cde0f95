//! Topic endpoints.
//!
//! The topic mirror embeds a snapshot of its subject, so renaming a
//! subject leaves existing topic mirrors stale until each topic is
//! mutated again.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::{Subject, Topic};
use scifun_persistence::index::{SearchIndex, SearchQuery};
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::DocumentStore;
use scifun_persistence::sync::TOPIC_INDEX;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_id, populate};
use crate::state::AppState;

/// Query parameters for `GET /topic/get-topics`.
#[derive(Debug, Deserialize)]
pub struct TopicListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    #[serde(rename = "subjectId")]
    subject_id: Option<String>,
    search: Option<String>,
}

/// `POST /topic/create-topic`
pub async fn create_topic<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let mut topic = state.store().insert(Topic::COLLECTION, body).await?;
    let id = parse_id(
        topic["_id"].as_str().unwrap_or_default(),
        "ID topic không hợp lệ",
    )?;
    state.sync().upsert_topic(&id).await?;
    populate(state.store(), &mut topic, "subject", Subject::COLLECTION).await?;
    Ok(Envelope::ok("Tạo chủ đề thành công", topic))
}

/// `PUT /topic/update-topic/:_id`
pub async fn update_topic<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID topic không hợp lệ")?;
    let mut topic = state
        .store()
        .update_by_id(Topic::COLLECTION, &id, body)
        .await?
        .ok_or_else(|| ApiError::msg("Topic không tồn tại"))?;
    state.sync().upsert_topic(&id).await?;
    populate(state.store(), &mut topic, "subject", Subject::COLLECTION).await?;
    Ok(Envelope::ok("Cập nhật chủ đề thành công", topic))
}

/// `DELETE /topic/delete-topic/:_id`
pub async fn delete_topic<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID topic không hợp lệ")?;
    let mut deleted = state
        .store()
        .delete_by_id(Topic::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Topic không tồn tại"))?;
    state.sync().delete_mirror(TOPIC_INDEX, "Topic", &id).await?;
    populate(state.store(), &mut deleted, "subject", Subject::COLLECTION).await?;
    Ok(Envelope::ok("Xóa chủ đề thành công", deleted))
}

/// `GET /topic/get-topics?page&limit&subjectId&search`
pub async fn get_topics<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<TopicListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let search = SearchQuery::new(&["name"], &params)
        .with_text(query.search)
        .with_parent(
            "subject._id",
            query.subject_id.filter(|s| !s.trim().is_empty()),
        );
    let found = state.index().search(TOPIC_INDEX, &search).await?;

    let documents: Vec<Value> = found.hits.into_iter().map(|h| h.into_document()).collect();
    let page = Page::from_window(documents, found.total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách topic thành công",
        page.into_keyed("topics"),
    ))
}

/// `GET /topic/get-topicById/:_id`
pub async fn get_topic_by_id<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID topic không hợp lệ")?;
    let mut topic = state
        .store()
        .find_by_id(Topic::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Topic không tồn tại"))?;
    populate(state.store(), &mut topic, "subject", Subject::COLLECTION).await?;
    Ok(Envelope::ok("Lấy chi tiết chủ đề thành công", topic))
}
