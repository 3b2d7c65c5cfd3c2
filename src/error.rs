//! Error taxonomy and the HTTP error envelope.
//!
//! Every handler-level fault ends up as an [`ApiError`] rendered as
//! `{"error": "<message>"}` so clients see one consistent shape.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Token and gate failures. The variants are deliberately distinct because
/// the gate maps them to different status codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header, no `Bearer ` prefix, or an empty token.
    #[error("Access token required")]
    MissingToken,

    /// Signature checked out but the expiry has passed.
    #[error("Token has expired")]
    Expired,

    /// Bad signature or a token that is not structurally a JWT.
    #[error("Invalid token")]
    InvalidToken,

    /// JWT_SECRET is not configured; signing and verification refuse to run.
    #[error("Server configuration error")]
    MissingSecret,

    /// Verification failed for a reason unrelated to the token itself.
    #[error("Token verification failed")]
    Verification,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::Expired => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::MissingSecret | AuthError::Verification => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        ApiError::new(self.status(), self.to_string()).into_response()
    }
}

/// A fault that has already been mapped to a client-facing status + message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with a generic message; the real cause is logged server-side only.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::new(err.status(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
