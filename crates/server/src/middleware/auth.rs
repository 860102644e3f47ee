//! Authentication middleware and extractors.
//!
//! Provides an extractor for requiring bearer-token authentication in
//! route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::Account;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Reads the `Authorization: Bearer <token>` header and resolves it to the
/// owning account. Rejects with 401 when the header is missing, malformed
/// or carries an unknown token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAccount(account): RequireAccount,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.email)
/// }
/// ```
pub struct RequireAccount(pub Account);

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let account = AuthService::new(state.store())
            .resolve_token(token)
            .await?;

        Ok(Self(account))
    }
}
