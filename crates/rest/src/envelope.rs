//! The fixed response envelope.
//!
//! Every endpoint answers HTTP 200 at the transport layer; the outcome
//! lives in the envelope's `status` field (200 success, 400 handled
//! failure, 500 unhandled). Existing clients parse this shape, so it is
//! preserved exactly, including the `success: false` flag the auth
//! middleware adds to its rejections and the top-level `token` field on
//! login.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// The `{status, message, data}` wrapper shared by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Application-level outcome: 200, 400, or 500.
    pub status: u16,
    /// Present (and `false`) only on auth-middleware rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Human-readable outcome message.
    pub message: String,
    /// Access token, only on login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Payload, omitted when the operation carries none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// A success with a payload.
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: 200,
            success: None,
            message: message.into(),
            token: None,
            data: Some(data),
        }
    }

    /// A success with no payload.
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            success: None,
            message: message.into(),
            token: None,
            data: None,
        }
    }

    /// A handled failure.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            success: None,
            message: message.into(),
            token: None,
            data: None,
        }
    }

    /// An unhandled failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            success: None,
            message: message.into(),
            token: None,
            data: None,
        }
    }

    /// An auth-middleware rejection, which carries `success: false`.
    pub fn reject(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: Some(false),
            message: message.into(),
            token: None,
            data: None,
        }
    }

    /// Attaches the login token.
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        // transport status is always 200; the envelope carries the outcome
        (StatusCode::OK, Json(self)).into_response()
    }
}
