//! Quiz result listing.

use axum::extract::{Query, State};
use serde::Deserialize;

use scifun_persistence::entities::{Quiz, QuizResult};
use scifun_persistence::index::SearchIndex;
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::{DocumentStore, FindOptions, SortOrder};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::populate;
use crate::state::AppState;

/// Query parameters for `GET /submisstion/get-all`.
#[derive(Debug, Deserialize)]
pub struct ResultListQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

/// `GET /submisstion/get-all?page&limit`
///
/// Most recently attempted quizzes first; defaults to the first page of
/// ten.
pub async fn get_results<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<ResultListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: Some(query.page.unwrap_or(1)),
        limit: Some(query.limit.unwrap_or(10)),
    };
    let (skip, limit) = params.window();
    let options =
        FindOptions::window(skip, limit).sorted_by("lastSubmissionAt", SortOrder::Descending);
    let mut results = state
        .store()
        .find(QuizResult::COLLECTION, &[], &options)
        .await?;
    let total = state.store().count(QuizResult::COLLECTION, &[]).await?;

    for result in &mut results {
        populate(state.store(), result, "quiz", Quiz::COLLECTION).await?;
    }
    let page = Page::from_window(results, total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách thành công",
        serde_json::to_value(page).map_err(|e| ApiError::Internal(e.to_string()))?,
    ))
}
