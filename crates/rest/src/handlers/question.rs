//! Question endpoints.
//!
//! Questions live only in the primary store; the listing endpoint pages
//! straight off the store instead of the search index.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::{Question, Quiz};
use scifun_persistence::index::SearchIndex;
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::{DocumentStore, Filter, FindOptions, SortOrder};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_id, populate};
use crate::state::AppState;

/// Query parameters for `GET /question/get-questions`.
#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    #[serde(rename = "quizId")]
    quiz_id: Option<String>,
}

/// `POST /question/create-question`
pub async fn create_question<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let mut question = state.store().insert(Question::COLLECTION, body).await?;
    populate(state.store(), &mut question, "quiz", Quiz::COLLECTION).await?;
    Ok(Envelope::ok("Thêm thành công", question))
}

/// `PUT /question/update-question/:_id`
pub async fn update_question<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID câu hỏi không hợp lệ")?;
    let mut question = state
        .store()
        .update_by_id(Question::COLLECTION, &id, body)
        .await?
        .ok_or_else(|| ApiError::msg("Câu hỏi không tồn tại"))?;
    populate(state.store(), &mut question, "quiz", Quiz::COLLECTION).await?;
    Ok(Envelope::ok("Cập nhật thành công", question))
}

/// `DELETE /question/delete-question/:_id`
pub async fn delete_question<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID câu hỏi không hợp lệ")?;
    let question = state
        .store()
        .delete_by_id(Question::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Câu hỏi không tồn tại"))?;
    Ok(Envelope::ok(
        "Xóa thành công",
        serde_json::json!({
            "message": "Xóa câu hỏi thành công",
            "question": question,
        }),
    ))
}

/// `GET /question/get-questionById/:_id`
pub async fn get_question_by_id<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID câu hỏi không hợp lệ")?;
    let mut question = state
        .store()
        .find_by_id(Question::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Câu hỏi không tồn tại"))?;
    populate(state.store(), &mut question, "quiz", Quiz::COLLECTION).await?;
    Ok(Envelope::ok("Lấy chi tiết thành công", question))
}

/// `GET /question/get-questions?page&limit&quizId`
///
/// Defaults to the first page of ten, newest first.
pub async fn get_questions<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<QuestionListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: Some(query.page.unwrap_or(1)),
        limit: Some(query.limit.unwrap_or(10)),
    };
    let mut filters = Vec::new();
    if let Some(quiz_id) = query.quiz_id.filter(|s| !s.trim().is_empty()) {
        filters.push(Filter::Eq("quiz".to_string(), Value::String(quiz_id)));
    }

    let (skip, limit) = params.window();
    let options = FindOptions::window(skip, limit).sorted_by("_id", SortOrder::Descending);
    let mut questions = state
        .store()
        .find(Question::COLLECTION, &filters, &options)
        .await?;
    let total = state.store().count(Question::COLLECTION, &filters).await?;

    for question in &mut questions {
        populate(state.store(), question, "quiz", Quiz::COLLECTION).await?;
    }
    let page = Page::from_window(questions, total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách thành công",
        serde_json::to_value(page).map_err(|e| ApiError::Internal(e.to_string()))?,
    ))
}
