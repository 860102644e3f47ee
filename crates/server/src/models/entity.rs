//! Cached upstream entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comicvault_core::{EntityId, EntityKind, UpstreamId};

/// Thumbnail reference as the upstream API ships it: a base path plus an
/// image extension, joined client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

/// A local copy of an upstream comic or character record.
///
/// Created lazily the first time any account favorites the upstream id and
/// deleted by the orphan sweep once no account references it. At most one
/// row exists per `upstream_id`.
#[derive(Debug, Clone, Serialize)]
pub struct CachedEntity {
    /// Locally assigned key.
    pub id: EntityId,
    /// External key; used for cache lookups and favorite removal.
    pub upstream_id: UpstreamId,
    pub kind: EntityKind,
    /// Upstream `title` for comics, `name` for characters.
    pub label: String,
    pub description: Option<String>,
    pub thumbnail: Thumbnail,
    pub created_at: DateTime<Utc>,
}

/// An entity about to enter the cache.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub upstream_id: UpstreamId,
    pub kind: EntityKind,
    pub label: String,
    pub description: Option<String>,
    pub thumbnail: Thumbnail,
}
