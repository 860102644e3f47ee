//! Favorites error types.

use thiserror::Error;

use crate::store::StoreError;
use crate::upstream::UpstreamError;

/// Errors that can occur during favorites operations.
#[derive(Debug, Error)]
pub enum FavoriteError {
    /// The upstream id does not exist (upstream 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The removal target is not in the account's favorites.
    #[error("not a favorite")]
    NotAFavorite,

    /// Upstream API failure.
    #[error("upstream error: {0}")]
    Upstream(UpstreamError),

    /// Store/database error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
