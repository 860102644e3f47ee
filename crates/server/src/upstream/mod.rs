//! Third-party comics/characters API access.
//!
//! The upstream is an opaque data source: single-record lookups feed the
//! entity cache, listing endpoints are proxied verbatim. [`MarvelClient`] is
//! the production client; the [`UpstreamSource`] trait is the seam the
//! routes and services work against so tests can substitute a stub.

pub mod marvel;

pub use marvel::MarvelClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use comicvault_core::{EntityKind, UpstreamId};

use crate::models::Thumbnail;

/// Errors from the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure (connect error, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status. The body is kept so it
    /// can be forwarded to the client verbatim.
    #[error("upstream returned status {status}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    /// Upstream answered 2xx but the payload did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Whether this is an upstream 404 for the requested record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// A single record as the upstream API ships it.
///
/// Comics carry `title`, characters carry `name`; both carry a description
/// and a thumbnail reference.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRecord {
    #[serde(rename = "_id")]
    pub id: UpstreamId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub thumbnail: Thumbnail,
}

impl UpstreamRecord {
    /// Display label for the record: `title` for comics, `name` for
    /// characters.
    #[must_use]
    pub fn label(&self, kind: EntityKind) -> String {
        let label = match kind {
            EntityKind::Comic => self.title.as_deref(),
            EntityKind::Character => self.name.as_deref(),
        };
        label.unwrap_or_default().to_owned()
    }
}

/// Paging and search parameters forwarded to upstream listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListingParams {
    /// Search term (`title` for comics, `name` for characters).
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// The upstream data source contract.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetch a single record for the entity cache.
    async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &UpstreamId,
    ) -> Result<UpstreamRecord, UpstreamError>;

    /// Fetch a single record as raw JSON for verbatim proxying.
    async fn fetch_raw(
        &self,
        kind: EntityKind,
        id: &UpstreamId,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Paged listing (`/comics` or `/characters`), proxied verbatim.
    async fn list(
        &self,
        kind: EntityKind,
        params: &ListingParams,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Comics featuring a character (`/comics/{character_id}`), proxied
    /// verbatim.
    async fn comics_for_character(
        &self,
        character_id: &UpstreamId,
    ) -> Result<serde_json::Value, UpstreamError>;
}
