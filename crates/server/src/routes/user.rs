//! User route handlers: signup, login and the favorites ledger.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use comicvault_core::{EntityKind, UpstreamId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::services::auth::AuthService;
use crate::services::favorites::{FavoriteOutcome, FavoritesService};
use crate::state::AppState;

/// Signup/login request body. Exactly two fields; anything else is
/// rejected as an invalid body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// Unwrap a JSON body, folding every deserialization failure into the
/// same client-facing message.
fn parse_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(inner)| inner)
        .map_err(|_| AppError::BadRequest("Invalid body".to_owned()))
}

/// Register a new account.
pub async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let body = parse_body(body)?;

    let account = AuthService::new(state.store())
        .signup(&body.email, &body.password)
        .await?;

    tracing::info!(account_id = %account.id, "Account created");

    Ok((StatusCode::CREATED, Json(json!({ "token": account.token }))))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let body = parse_body(body)?;

    let account = AuthService::new(state.store())
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(json!({ "token": account.token })))
}

/// Add an upstream record to the caller's favorites.
///
/// `201` when appended, `200` when it was already in the ledger.
pub async fn add_favorite(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path((kind, upstream_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let kind: EntityKind = kind
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown kind: {kind}")))?;
    let upstream_id = UpstreamId::new(upstream_id);

    let outcome = FavoritesService::new(state.store(), state.upstream())
        .add(&account, kind, &upstream_id)
        .await?;

    let response = match outcome {
        FavoriteOutcome::Added(entity) => (
            StatusCode::CREATED,
            Json(json!({ "message": "favorite added", "favorite": entity })),
        ),
        FavoriteOutcome::AlreadyFavorite(entity) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{kind} is already a favorite"),
                "favorite": entity,
            })),
        ),
    };

    Ok(response)
}

/// List the caller's favorites in append order.
pub async fn list_favorites(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<impl IntoResponse> {
    let results = FavoritesService::new(state.store(), state.upstream())
        .list(&account)
        .await?;

    Ok(Json(json!({ "count": results.len(), "results": results })))
}

/// Remove a favorite by upstream id.
pub async fn remove_favorite(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(upstream_id): Path<String>,
) -> Result<impl IntoResponse> {
    let upstream_id = UpstreamId::new(upstream_id);

    FavoritesService::new(state.store(), state.upstream())
        .remove(&account, &upstream_id)
        .await?;

    Ok(Json(json!({ "message": "favorite removed" })))
}
