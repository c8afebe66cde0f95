//! Video lesson endpoints.
//!
//! Video URLs are normalized to the YouTube embed form on every write.
//! Lessons are store-only; listing filters by topic and title substring.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::{Topic, VideoLesson};
use scifun_persistence::index::SearchIndex;
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::{DocumentStore, Filter, FindOptions, SortOrder};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_id, populate};
use crate::state::AppState;
use crate::video_url::to_youtube_embed;

/// Query parameters for `GET /video-lesson/list`.
#[derive(Debug, Deserialize)]
pub struct VideoLessonListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    #[serde(rename = "topicId")]
    topic_id: Option<String>,
    search: Option<String>,
}

/// Rewrites the `url` field to its embed form, when present.
fn normalize_url(body: &mut Value) {
    if let Some(url) = body.get("url").and_then(Value::as_str) {
        let embed = to_youtube_embed(url);
        body["url"] = Value::String(embed);
    }
}

/// `POST /video-lesson/create`
pub async fn create_video_lesson<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(mut body): Json<Value>,
) -> Envelope {
    normalize_url(&mut body);
    let created: ApiResult<Value> = async {
        let mut video = state.store().insert(VideoLesson::COLLECTION, body).await?;
        populate(state.store(), &mut video, "topic", Topic::COLLECTION).await?;
        Ok(video)
    }
    .await;

    match created {
        Ok(video) => Envelope::ok("Tạo video lesson thành công", video),
        // create keeps the legacy prefixed error text
        Err(e) => Envelope::fail(format!("Error creating video lesson: {e}")),
    }
}

/// `PUT /video-lesson/update/:_id`
pub async fn update_video_lesson<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID video lesson không hợp lệ")?;
    normalize_url(&mut body);
    let mut video = state
        .store()
        .update_by_id(VideoLesson::COLLECTION, &id, body)
        .await?
        .ok_or_else(|| ApiError::msg("Video lesson không tồn tại"))?;
    populate(state.store(), &mut video, "topic", Topic::COLLECTION).await?;
    Ok(Envelope::ok("Cập nhật video lesson thành công", video))
}

/// `DELETE /video-lesson/delete/:_id`
pub async fn delete_video_lesson<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID video lesson không hợp lệ")?;
    let video = state
        .store()
        .delete_by_id(VideoLesson::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Video lesson không tồn tại"))?;
    Ok(Envelope::ok("Xóa thành công", video))
}

/// `GET /video-lesson/detail/:_id`
pub async fn get_video_lesson_by_id<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID video lesson không hợp lệ")?;
    let mut video = state
        .store()
        .find_by_id(VideoLesson::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Video lesson không tồn tại"))?;
    populate(state.store(), &mut video, "topic", Topic::COLLECTION).await?;
    Ok(Envelope::ok("Lấy chi tiết video lesson thành công", video))
}

/// `GET /video-lesson/list?page&limit&topicId&search`
pub async fn get_video_lessons<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<VideoLessonListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let mut filters = Vec::new();
    if let Some(topic_id) = query.topic_id.filter(|s| !s.trim().is_empty()) {
        filters.push(Filter::Eq("topic".to_string(), Value::String(topic_id)));
    }
    if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
        filters.push(Filter::Contains("title".to_string(), search));
    }

    let (skip, limit) = params.window();
    let options = FindOptions::window(skip, limit).sorted_by("_id", SortOrder::Descending);
    let mut videos = state
        .store()
        .find(VideoLesson::COLLECTION, &filters, &options)
        .await?;
    let total = state
        .store()
        .count(VideoLesson::COLLECTION, &filters)
        .await?;

    for video in &mut videos {
        populate(state.store(), video, "topic", Topic::COLLECTION).await?;
    }
    let page = Page::from_window(videos, total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách video lessons thành công",
        serde_json::to_value(page).map_err(|e| ApiError::Internal(e.to_string()))?,
    ))
}
