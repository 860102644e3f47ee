//! `PostgreSQL` implementation of the [`Store`] trait.
//!
//! Queries are bound at runtime; the schema lives in `migrations/` and is
//! embedded via [`MIGRATOR`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use comicvault_core::{AccountId, Email, EntityId, EntityKind, UpstreamId};

use super::{Store, StoreError};
use crate::models::{Account, CachedEntity, NewAccount, NewEntity, Thumbnail};

/// Embedded migrations from `crates/server/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Store backed by a `PostgreSQL` pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_account(row: &PgRow) -> Result<Account, StoreError> {
    let favorites: Vec<Uuid> = row.try_get("favorites")?;

    Ok(Account {
        id: row.try_get::<AccountId, _>("id")?,
        email: row.try_get::<Email, _>("email")?,
        salt: row.try_get("salt")?,
        hash: row.try_get("hash")?,
        token: row.try_get("token")?,
        favorites: favorites.into_iter().map(EntityId::new).collect(),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn map_entity(row: &PgRow) -> Result<CachedEntity, StoreError> {
    let kind = row
        .try_get::<String, _>("kind")?
        .parse::<EntityKind>()
        .map_err(|e| StoreError::DataCorruption(format!("invalid kind in database: {e}")))?;

    Ok(CachedEntity {
        id: row.try_get::<EntityId, _>("id")?,
        upstream_id: row.try_get::<UpstreamId, _>("upstream_id")?,
        kind,
        label: row.try_get("label")?,
        description: row.try_get("description")?,
        thumbnail: Thumbnail {
            path: row.try_get("thumbnail_path")?,
            extension: row.try_get("thumbnail_extension")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, email, salt, hash, token, favorites, created_at";
const ENTITY_COLUMNS: &str =
    "id, upstream_id, kind, label, description, thumbnail_path, thumbnail_extension, created_at";

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let id = AccountId::generate();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO account (id, email, salt, hash, token, favorites, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(&account.email)
        .bind(&account.salt)
        .bind(&account.hash)
        .bind(&account.token)
        .bind(Vec::<Uuid>::new())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already registered".to_owned());
            }
            StoreError::Database(e)
        })?;

        Ok(Account {
            id,
            email: account.email,
            salt: account.salt,
            hash: account.hash,
            token: account.token,
            favorites: Vec::new(),
            created_at,
        })
    }

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_account).transpose()
    }

    async fn find_account_by_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_account).transpose()
    }

    async fn update_favorites(
        &self,
        account_id: AccountId,
        favorites: &[EntityId],
    ) -> Result<(), StoreError> {
        let uuids: Vec<Uuid> = favorites.iter().map(|id| id.as_uuid()).collect();

        let result = sqlx::query("UPDATE account SET favorites = $1 WHERE id = $2")
            .bind(uuids)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn insert_entity(&self, entity: NewEntity) -> Result<CachedEntity, StoreError> {
        let id = EntityId::generate();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO entity (id, upstream_id, kind, label, description,
                                 thumbnail_path, thumbnail_extension, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&entity.upstream_id)
        .bind(entity.kind.as_str())
        .bind(&entity.label)
        .bind(&entity.description)
        .bind(&entity.thumbnail.path)
        .bind(&entity.thumbnail.extension)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("entity already cached".to_owned());
            }
            StoreError::Database(e)
        })?;

        Ok(CachedEntity {
            id,
            upstream_id: entity.upstream_id,
            kind: entity.kind,
            label: entity.label,
            description: entity.description,
            thumbnail: entity.thumbnail,
            created_at,
        })
    }

    async fn find_entity_by_upstream_id(
        &self,
        upstream_id: &UpstreamId,
    ) -> Result<Option<CachedEntity>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entity WHERE upstream_id = $1"
        ))
        .bind(upstream_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_entity).transpose()
    }

    async fn get_entities(&self, ids: &[EntityId]) -> Result<Vec<CachedEntity>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();

        let rows = sqlx::query(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entity WHERE id = ANY($1)"
        ))
        .bind(uuids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id = std::collections::HashMap::with_capacity(rows.len());
        for row in &rows {
            let entity = map_entity(row)?;
            by_id.insert(entity.id, entity);
        }

        // Re-establish the ledger's append order; the database returns rows
        // in no particular order.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn is_entity_referenced(&self, id: EntityId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM account WHERE $1 = ANY(favorites))")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<bool, _>(0)?)
    }

    async fn delete_entity(&self, id: EntityId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM entity WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
