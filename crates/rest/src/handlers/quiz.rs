//! Quiz endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::{Quiz, Subject, Topic};
use scifun_persistence::index::{SearchIndex, SearchQuery};
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::DocumentStore;
use scifun_persistence::sync::QUIZ_INDEX;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_id, populate};
use crate::state::AppState;

/// Query parameters for `GET /quiz/get-quizzes`.
#[derive(Debug, Deserialize)]
pub struct QuizListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    #[serde(rename = "topicId")]
    topic_id: Option<String>,
    search: Option<String>,
}

/// Resolves the quiz's topic and, through it, the subject.
async fn populate_chain<S: DocumentStore>(store: &S, quiz: &mut Value) -> ApiResult<()> {
    populate(store, quiz, "topic", Topic::COLLECTION).await?;
    if let Some(topic) = quiz.get_mut("topic").filter(|t| t.is_object()) {
        populate(store, topic, "subject", Subject::COLLECTION).await?;
    }
    Ok(())
}

/// `POST /quiz/create-quiz`
pub async fn create_quiz<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let mut quiz = state.store().insert(Quiz::COLLECTION, body).await?;
    let id = parse_id(
        quiz["_id"].as_str().unwrap_or_default(),
        "ID quiz không hợp lệ",
    )?;
    state.sync().upsert_quiz(&id).await?;
    populate_chain(state.store(), &mut quiz).await?;
    Ok(Envelope::ok("Tạo quiz thành công", quiz))
}

/// `PUT /quiz/update-quiz/:_id`
pub async fn update_quiz<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID quiz không hợp lệ")?;
    let mut quiz = state
        .store()
        .update_by_id(Quiz::COLLECTION, &id, body)
        .await?
        .ok_or_else(|| ApiError::msg("Quiz không tồn tại"))?;
    state.sync().upsert_quiz(&id).await?;
    populate_chain(state.store(), &mut quiz).await?;
    Ok(Envelope::ok("Cập nhật quiz thành công", quiz))
}

/// `DELETE /quiz/delete-quiz/:_id`
pub async fn delete_quiz<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID quiz không hợp lệ")?;
    let mut deleted = state
        .store()
        .delete_by_id(Quiz::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Quiz không tồn tại"))?;
    state.sync().delete_mirror(QUIZ_INDEX, "Quiz", &id).await?;
    populate(state.store(), &mut deleted, "topic", Topic::COLLECTION).await?;
    Ok(Envelope::ok("Xoá quiz thành công", deleted))
}

/// `GET /quiz/get-quizById/:_id`
pub async fn get_quiz_by_id<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID quiz không hợp lệ")?;
    let mut quiz = state
        .store()
        .find_by_id(Quiz::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Quiz không tồn tại"))?;
    populate_chain(state.store(), &mut quiz).await?;
    Ok(Envelope::ok("Lấy chi tiết quiz thành công", quiz))
}

/// `GET /quiz/get-quizzes?page&limit&topicId&search`
pub async fn get_quizzes<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<QuizListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let search = SearchQuery::new(&["title"], &params)
        .with_text(query.search)
        .with_parent(
            "topic._id",
            query.topic_id.filter(|s| !s.trim().is_empty()),
        );
    let found = state.index().search(QUIZ_INDEX, &search).await?;

    let documents: Vec<Value> = found.hits.into_iter().map(|h| h.into_document()).collect();
    let page = Page::from_window(documents, found.total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách quiz thành công",
        page.into_keyed("quizzes"),
    ))
}
