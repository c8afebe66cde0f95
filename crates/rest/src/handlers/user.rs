//! User account endpoints: login, admin user management, and the
//! self-service profile read.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use scifun_persistence::entities::User;
use scifun_persistence::index::SearchIndex;
use scifun_persistence::page::{Page, PageParams};
use scifun_persistence::store::{DocumentStore, Filter, FindOptions, SortOrder};

use crate::auth::{AuthUser, issue_token};
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_id, strip_user_secrets};
use crate::state::AppState;

const BCRYPT_COST: u32 = 10;

/// Body for `POST /user/login`.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

/// Query parameters for `GET /user/get-user-list`.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
}

/// `POST /user/login`
pub async fn login<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Envelope> {
    let filters = [Filter::Eq(
        "email".to_string(),
        Value::String(body.email.clone()),
    )];
    let mut user = state
        .store()
        .find_one(User::COLLECTION, &filters)
        .await?
        .ok_or_else(|| ApiError::msg("Email không tồn tại"))?;

    if !user
        .get("isVerified")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(ApiError::msg("Tài khoản chưa xác thực OTP"));
    }

    let hash = user.get("password").and_then(Value::as_str).unwrap_or("");
    let valid =
        bcrypt::verify(&body.password, hash).map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::msg("Sai mật khẩu"));
    }

    let user_id = user.get("_id").and_then(Value::as_str).unwrap_or_default();
    let role = user
        .get("role")
        .and_then(Value::as_str)
        .unwrap_or("USER")
        .to_string();
    let token = issue_token(state.config(), user_id, &body.email, &role)?;

    strip_user_secrets(&mut user);
    Ok(Envelope::ok("Đăng nhập thành công", user).with_token(token))
}

/// `POST /user/create-user`
pub async fn create_user<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Json(mut body): Json<Value>,
) -> ApiResult<Envelope> {
    if let Some(email) = body.get("email").and_then(Value::as_str) {
        let filters = [Filter::Eq(
            "email".to_string(),
            Value::String(email.to_string()),
        )];
        if state
            .store()
            .find_one(User::COLLECTION, &filters)
            .await?
            .is_some()
        {
            return Err(ApiError::msg("Email đã tồn tại trong hệ thống"));
        }
    }

    if let Some(password) = body.get("password").and_then(Value::as_str) {
        let hashed =
            bcrypt::hash(password, BCRYPT_COST).map_err(|e| ApiError::Internal(e.to_string()))?;
        body["password"] = Value::String(hashed);
    }
    // Admin-created accounts skip the OTP flow entirely.
    body["isVerified"] = Value::Bool(true);

    let mut user = state.store().insert(User::COLLECTION, body).await?;
    strip_user_secrets(&mut user);
    Ok(Envelope::ok("Tạo tài khoản thành công", user))
}

/// `DELETE /user/delete-user/:_id`
pub async fn delete_user<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    let id = parse_id(&id, "ID người dùng không hợp lệ")?;
    state
        .store()
        .delete_by_id(User::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Người dùng không tồn tại"))?;
    Ok(Envelope::ok_message("Xóa người dùng thành công"))
}

/// `GET /user/get-user/:_id`
///
/// Callers may only read their own record, regardless of role.
pub async fn get_user<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    if auth.user_id != id {
        return Err(ApiError::msg("Bạn không có quyền truy cập thông tin này"));
    }
    let id = parse_id(&id, "ID người dùng không hợp lệ")?;
    let mut user = state
        .store()
        .find_by_id(User::COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::msg("Người dùng không tồn tại"))?;
    strip_user_secrets(&mut user);
    if let Some(obj) = user.as_object_mut() {
        obj.remove("isVerified");
    }
    Ok(Envelope::ok("Lấy thông tin người dùng thành công", user))
}

/// `GET /user/get-user-list?page&limit&search`
///
/// `search` matches email or full name as a case-insensitive substring.
pub async fn get_user_list<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Envelope> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let mut filters = Vec::new();
    if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
        filters.push(Filter::Or(vec![
            Filter::Contains("email".to_string(), search.clone()),
            Filter::Contains("fullname".to_string(), search),
        ]));
    }

    let (skip, limit) = params.window();
    let options = FindOptions::window(skip, limit).sorted_by("createdAt", SortOrder::Descending);
    let mut users = state.store().find(User::COLLECTION, &filters, &options).await?;
    let total = state.store().count(User::COLLECTION, &filters).await?;

    for user in &mut users {
        strip_user_secrets(user);
    }
    let page = Page::from_window(users, total, &params);
    Ok(Envelope::ok(
        "Lấy danh sách người dùng thành công",
        page.into_keyed("users"),
    ))
}
