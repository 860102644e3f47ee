//! Unified error handling for the HTTP surface.
//!
//! Provides a unified `AppError` type mapped to JSON `{"message": ...}`
//! responses. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::favorites::FavoriteError;
use crate::store::StoreError;
use crate::upstream::UpstreamError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found. The message is returned to the client verbatim.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream API operation failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Database operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::BadRequest(format!("Invalid email: {e}")),
            AuthError::EmptyPassword => Self::BadRequest("Invalid body".to_owned()),
            AuthError::InvalidCredentials | AuthError::InvalidToken => Self::Unauthorized,
            AuthError::EmailTaken => {
                Self::Conflict("An account with this email already exists".to_owned())
            }
            AuthError::Store(e) => Self::Store(e),
        }
    }
}

impl From<FavoriteError> for AppError {
    fn from(err: FavoriteError) -> Self {
        match err {
            FavoriteError::NotFound(msg) => Self::NotFound(msg),
            FavoriteError::NotAFavorite => Self::BadRequest("comic is not a favorite".to_owned()),
            FavoriteError::Upstream(e) => Self::Upstream(e),
            FavoriteError::Store(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "Request error");
        }

        // Upstream errors with a status forward the upstream's own status
        // and body so proxy routes stay transparent.
        if let Self::Upstream(UpstreamError::Status { status, body }) = self {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            return (status, Json(body)).into_response();
        }

        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::BadRequest(msg) | Self::Conflict(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Unauthorized => "Unauthorized".to_owned(),
            Self::Upstream(_) => "External service error".to_owned(),
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_owned(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
