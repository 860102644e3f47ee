//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (DB ping)
//!
//! # User (bearer token where marked)
//! POST   /user/signup                       - Register, returns token
//! POST   /user/login                        - Login, returns token
//! GET    /user/favorites                    - List favorites (auth)
//! POST   /user/favorites/{kind}/{id}        - Add favorite (auth)
//! DELETE /user/favorites/{id}               - Remove favorite (auth)
//!
//! # Upstream proxy
//! GET  /comics?title&limit&skip             - Comic listing
//! GET  /comics/{character_id}               - Comics featuring a character
//! GET  /comic/{comic_id}                    - Single comic
//! GET  /characters?name&limit&skip          - Character listing
//! GET  /character/{character_id}            - Single character
//! ```
//!
//! Anything else falls through to a JSON 404.

pub mod characters;
pub mod comics;
pub mod user;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/favorites", get(user::list_favorites))
        .route("/favorites/{kind}/{upstream_id}", post(user::add_favorite))
        .route("/favorites/{upstream_id}", axum::routing::delete(user::remove_favorite))
}

/// Create the upstream proxy routes router.
pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/comics", get(comics::index))
        .route("/comics/{character_id}", get(comics::for_character))
        .route("/comic/{comic_id}", get(comics::show))
        .route("/characters", get(characters::index))
        .route("/character/{character_id}", get(characters::show))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user_routes())
        .merge(proxy_routes())
}

/// Build the full application with health endpoints, middleware layers and
/// the JSON 404 fallback.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness check.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: verifies the database connection.
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

/// JSON 404 for unmatched paths.
async fn fallback() -> AppError {
    AppError::NotFound("Route not found".to_owned())
}

/// Validate listing paging parameters before forwarding them upstream.
pub(crate) fn validate_paging(limit: Option<i64>, skip: Option<i64>) -> Result<()> {
    if let Some(limit) = limit
        && !(1..=100).contains(&limit)
    {
        return Err(AppError::BadRequest(
            "Limit must be set between 1 and 100".to_owned(),
        ));
    }
    if let Some(skip) = skip
        && skip < 0
    {
        return Err(AppError::BadRequest(
            "Skip must be a positive integer".to_owned(),
        ));
    }
    Ok(())
}
