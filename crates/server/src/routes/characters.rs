//! Character proxy route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use comicvault_core::{EntityKind, UpstreamId};

use crate::error::Result;
use crate::state::AppState;
use crate::upstream::ListingParams;

use super::validate_paging;

/// Query parameters for the character listing.
#[derive(Debug, Deserialize)]
pub struct CharactersQuery {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Paged character listing, optionally filtered by name.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CharactersQuery>,
) -> Result<Json<Value>> {
    validate_paging(query.limit, query.skip)?;

    let body = state
        .upstream()
        .list(
            EntityKind::Character,
            &ListingParams {
                search: query.name,
                limit: query.limit,
                skip: query.skip,
            },
        )
        .await?;

    Ok(Json(body))
}

/// A single character.
pub async fn show(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
) -> Result<Json<Value>> {
    let body = state
        .upstream()
        .fetch_raw(EntityKind::Character, &UpstreamId::new(character_id))
        .await?;

    Ok(Json(body))
}
