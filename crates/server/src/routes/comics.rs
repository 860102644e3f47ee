//! Comic proxy route handlers.
//!
//! These forward to the upstream API and return its JSON verbatim.

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

/// Query parameters for the comic listing.
#[derive(Debug, Deserialize)]
pub struct ComicsQuery {
    pub title: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Paged comic listing, optionally filtered by title.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ComicsQuery>,
) -> Result<Json<Value>> {
    validate_paging(query.limit, query.skip)?;

    let body = state
        .upstream()
        .list(
            EntityKind::Comic,
            &ListingParams {
                search: query.title,
                limit: query.limit,
                skip: query.skip,
            },
        )
        .await?;

    Ok(Json(body))
}

/// Comics featuring a character.
pub async fn for_character(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
) -> Result<Json<Value>> {
    let body = state
        .upstream()
        .comics_for_character(&UpstreamId::new(character_id))
        .await?;

    Ok(Json(body))
}

/// A single comic.
pub async fn show(
    State(state): State<AppState>,
    Path(comic_id): Path<String>,
) -> Result<Json<Value>> {
    let body = state
        .upstream()
        .fetch_raw(EntityKind::Comic, &UpstreamId::new(comic_id))
        .await?;

    Ok(Json(body))
}
