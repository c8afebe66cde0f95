//! Bearer-token authentication and role gating.
//!
//! Tokens are HS256 JWTs carrying `{userId, email, role, exp}`. The
//! [`authenticate`] middleware verifies the `Authorization: Bearer` header
//! and stashes the caller as an [`AuthUser`] request extension;
//! [`require_admin`] then gates the admin-only routes. Rejections use the
//! envelope with `success: false` and a message naming the specific
//! reason, as the deployed clients expect.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::ServerConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use scifun_persistence::index::SearchIndex;
use scifun_persistence::store::DocumentStore;

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user's id.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Login email.
    pub email: String,
    /// `USER` or `ADMIN`.
    pub role: String,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
}

/// The authenticated caller, attached to the request by [`authenticate`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id from the token.
    pub user_id: String,
    /// Email from the token.
    pub email: String,
    /// Role from the token.
    pub role: String,
}

/// Signs an access token for a user.
pub fn issue_token(
    config: &ServerConfig,
    user_id: &str,
    email: &str,
    role: &str,
) -> ApiResult<String> {
    if config.jwt_secret.is_empty() {
        return Err(ApiError::Internal("Missing env JWT_SECRET".to_string()));
    }
    let claims = Claims {
        user_id: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() as u64) + config.jwt_expires_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))
}

fn reject(message: &str) -> Response {
    Envelope::reject(400, message).into_response()
}

/// Verifies the bearer token and attaches the caller to the request.
pub async fn authenticate<S: DocumentStore, I: SearchIndex>(
    State(state): State<AppState<S, I>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return reject("Vui lòng đăng nhập để tiếp tục");
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return reject("Token không đúng định dạng");
    };
    if token.trim().is_empty() {
        return reject("Token không tồn tại");
    }

    let secret = &state.config().jwt_secret;
    if secret.is_empty() {
        error!("JWT_SECRET is not configured");
        return Envelope::reject(500, "Lỗi xác thực người dùng").into_response();
    }

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    );
    let claims = match decoded {
        Ok(data) => data.claims,
        Err(e) => {
            return match e.kind() {
                ErrorKind::ExpiredSignature => {
                    reject("Token đã hết hạn, vui lòng đăng nhập lại")
                }
                ErrorKind::ImmatureSignature => reject("Token chưa có hiệu lực"),
                _ => reject("Token không hợp lệ"),
            };
        }
    };

    if claims.user_id.is_empty() || claims.email.is_empty() || claims.role.is_empty() {
        return reject("Token không hợp lệ");
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
        role: claims.role,
    });
    next.run(request).await
}

/// Rejects callers whose role is not `ADMIN`. Must run after
/// [`authenticate`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return reject("Không tìm thấy thông tin người dùng");
    };
    if user.role != "ADMIN" {
        return reject("Bạn không có quyền truy cập tài nguyên này");
    }
    next.run(request).await
}
