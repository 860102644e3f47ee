//! Durable storage for accounts and the entity cache.
//!
//! The [`Store`] trait is the boundary the services work against: a plain
//! CRUD surface over two collections. [`postgres::PgStore`] is the production
//! implementation; [`memory::MemoryStore`] backs the test suite and local
//! development without a database.
//!
//! Eviction support (`is_entity_referenced` + `delete_entity`) lives behind
//! this trait so the on-demand reference scan could later be replaced by a
//! maintained counter without touching the services.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use comicvault_core::{AccountId, Email, EntityId, UpstreamId};

use crate::models::{Account, CachedEntity, NewAccount, NewEntity};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or upstream id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// CRUD surface over the two persisted collections (accounts, entities).
#[async_trait]
pub trait Store: Send + Sync {
    /// Verify the store is reachable (readiness probe).
    async fn ping(&self) -> Result<(), StoreError>;

    /// Persist a new account with an empty favorites list.
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Look up an account by email.
    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Look up an account by exact bearer-token match.
    async fn find_account_by_token(&self, token: &str) -> Result<Option<Account>, StoreError>;

    /// Replace an account's favorites list.
    ///
    /// This is the persist half of the ledger's read-modify-write cycle;
    /// concurrent writers to the same account can lose updates (known race,
    /// preserved as documented behavior).
    ///
    /// Returns `StoreError::NotFound` if the account does not exist.
    async fn update_favorites(
        &self,
        account_id: AccountId,
        favorites: &[EntityId],
    ) -> Result<(), StoreError>;

    /// Insert a new cache entry.
    ///
    /// Returns `StoreError::Conflict` if an entry with the same upstream id
    /// already exists (a concurrent creator won); callers re-fetch on
    /// conflict.
    async fn insert_entity(&self, entity: NewEntity) -> Result<CachedEntity, StoreError>;

    /// Look up a cache entry by its upstream id.
    async fn find_entity_by_upstream_id(
        &self,
        upstream_id: &UpstreamId,
    ) -> Result<Option<CachedEntity>, StoreError>;

    /// Expand a list of entity references, preserving the input order.
    /// References without a backing row are skipped.
    async fn get_entities(&self, ids: &[EntityId]) -> Result<Vec<CachedEntity>, StoreError>;

    /// Whether any account still holds a favorite reference to the entity.
    ///
    /// Recomputed on demand by scanning accounts, O(accounts).
    async fn is_entity_referenced(&self, id: EntityId) -> Result<bool, StoreError>;

    /// Delete a cache entry. Deleting an already-removed entry is not an
    /// error.
    async fn delete_entity(&self, id: EntityId) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
