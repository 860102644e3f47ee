//! Favorites ledger and entity cache.
//!
//! Each account holds an append-ordered list of references into a shared
//! local cache of upstream records. Cache entries are created lazily on
//! first favorite and swept away once no account references them.
//!
//! Duplicate-favorite policy: a second add of the same upstream id is a
//! success reported as [`FavoriteOutcome::AlreadyFavorite`], never an error.
//!
//! Known race: the ledger update is read-modify-write without an optimistic
//! lock, so concurrent mutations of the same account's favorites can lose
//! updates. Entity creation, by contrast, is protected by the unique index
//! on the upstream id plus a fetch-on-conflict retry.

mod error;

pub use error::FavoriteError;

use comicvault_core::{EntityKind, UpstreamId};

use crate::models::{Account, CachedEntity, NewEntity};
use crate::store::{Store, StoreError};
use crate::upstream::UpstreamSource;

/// Result of an add-favorite operation.
#[derive(Debug)]
pub enum FavoriteOutcome {
    /// The entity was appended to the ledger.
    Added(CachedEntity),
    /// The entity was already in the ledger; nothing changed.
    AlreadyFavorite(CachedEntity),
}

/// Favorites service.
pub struct FavoritesService<'a> {
    store: &'a dyn Store,
    source: &'a dyn UpstreamSource,
}

impl<'a> FavoritesService<'a> {
    /// Create a new favorites service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, source: &'a dyn UpstreamSource) -> Self {
        Self { store, source }
    }

    /// Add an upstream record to the account's favorites.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteError::NotFound` if the upstream id does not exist.
    /// Returns `FavoriteError::Upstream` if the upstream call fails.
    pub async fn add(
        &self,
        account: &Account,
        kind: EntityKind,
        upstream_id: &UpstreamId,
    ) -> Result<FavoriteOutcome, FavoriteError> {
        let entity = self.fetch_or_create(kind, upstream_id).await?;

        if account.favorites.contains(&entity.id) {
            return Ok(FavoriteOutcome::AlreadyFavorite(entity));
        }

        let mut favorites = account.favorites.clone();
        favorites.push(entity.id);
        self.store.update_favorites(account.id, &favorites).await?;

        Ok(FavoriteOutcome::Added(entity))
    }

    /// The account's favorite entities, in ledger (append) order.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteError::Store` if the store operation fails.
    pub async fn list(&self, account: &Account) -> Result<Vec<CachedEntity>, FavoriteError> {
        Ok(self.store.get_entities(&account.favorites).await?)
    }

    /// Remove a favorite by its upstream id, then sweep the cache entry if
    /// no account references it anymore.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteError::NotAFavorite` if the id is not in the
    /// account's favorites.
    pub async fn remove(
        &self,
        account: &Account,
        upstream_id: &UpstreamId,
    ) -> Result<(), FavoriteError> {
        let Some(entity) = self.store.find_entity_by_upstream_id(upstream_id).await? else {
            return Err(FavoriteError::NotAFavorite);
        };

        let mut favorites = account.favorites.clone();
        let before = favorites.len();
        favorites.retain(|id| *id != entity.id);
        if favorites.len() == before {
            return Err(FavoriteError::NotAFavorite);
        }

        self.store.update_favorites(account.id, &favorites).await?;
        self.sweep_orphan(&entity).await?;

        Ok(())
    }

    /// Fetch the cache entry for an upstream id, creating it from upstream
    /// on first use.
    ///
    /// Creation is read-check-then-create; losing the insert race to a
    /// concurrent creator surfaces as a unique-index conflict, answered by
    /// re-reading the winner's row.
    async fn fetch_or_create(
        &self,
        kind: EntityKind,
        upstream_id: &UpstreamId,
    ) -> Result<CachedEntity, FavoriteError> {
        if let Some(existing) = self.store.find_entity_by_upstream_id(upstream_id).await? {
            return Ok(existing);
        }

        let record = self
            .source
            .fetch_entity(kind, upstream_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    FavoriteError::NotFound(format!("no {kind} found with id {upstream_id}"))
                } else {
                    FavoriteError::Upstream(e)
                }
            })?;

        let label = record.label(kind);
        let new_entity = NewEntity {
            upstream_id: record.id,
            kind,
            label,
            description: record.description,
            thumbnail: record.thumbnail,
        };

        match self.store.insert_entity(new_entity).await {
            Ok(entity) => Ok(entity),
            Err(StoreError::Conflict(_)) => self
                .store
                .find_entity_by_upstream_id(upstream_id)
                .await?
                .ok_or(FavoriteError::Store(StoreError::NotFound)),
            Err(other) => Err(other.into()),
        }
    }

    /// Delete the cache entry if no account references it anymore.
    ///
    /// The reference count is recomputed by scanning accounts on demand.
    async fn sweep_orphan(&self, entity: &CachedEntity) -> Result<(), FavoriteError> {
        if !self.store.is_entity_referenced(entity.id).await? {
            tracing::debug!(
                upstream_id = %entity.upstream_id,
                kind = %entity.kind,
                "evicting unreferenced cache entry"
            );
            self.store.delete_entity(entity.id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::models::Account;
    use crate::services::auth::AuthService;
    use crate::store::memory::MemoryStore;
    use crate::upstream::{ListingParams, UpstreamError, UpstreamRecord};

    /// Upstream stub serving canned records and counting fetches.
    struct StubSource {
        records: HashMap<(EntityKind, String), UpstreamRecord>,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn new() -> Self {
            let mut records = HashMap::new();
            for (kind, id, label) in [
                (EntityKind::Comic, "123", "Amazing Fantasy #15"),
                (EntityKind::Comic, "456", "Tales of Suspense #39"),
                (EntityKind::Character, "789", "Spider-Man"),
            ] {
                let field = match kind {
                    EntityKind::Comic => "title",
                    EntityKind::Character => "name",
                };
                let record: UpstreamRecord = serde_json::from_value(json!({
                    "_id": id,
                    field: label,
                    "description": "desc",
                    "thumbnail": {"path": "http://img.example/t", "extension": "jpg"}
                }))
                .unwrap();
                records.insert((kind, id.to_owned()), record);
            }
            Self {
                records,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UpstreamSource for StubSource {
        async fn fetch_entity(
            &self,
            kind: EntityKind,
            id: &UpstreamId,
        ) -> Result<UpstreamRecord, UpstreamError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.records
                .get(&(kind, id.as_str().to_owned()))
                .cloned()
                .ok_or(UpstreamError::Status {
                    status: 404,
                    body: json!({"message": "not found"}),
                })
        }

        async fn fetch_raw(
            &self,
            kind: EntityKind,
            id: &UpstreamId,
        ) -> Result<serde_json::Value, UpstreamError> {
            self.fetch_entity(kind, id).await.map(|r| {
                json!({"_id": r.id, "title": r.title, "name": r.name})
            })
        }

        async fn list(
            &self,
            _kind: EntityKind,
            _params: &ListingParams,
        ) -> Result<serde_json::Value, UpstreamError> {
            Ok(json!({"count": 0, "results": []}))
        }

        async fn comics_for_character(
            &self,
            _character_id: &UpstreamId,
        ) -> Result<serde_json::Value, UpstreamError> {
            Ok(json!([]))
        }
    }

    async fn signup(store: &MemoryStore, email: &str) -> Account {
        AuthService::new(store).signup(email, "p1").await.unwrap()
    }

    /// Re-read an account after a ledger mutation.
    async fn reload(store: &MemoryStore, account: &Account) -> Account {
        store
            .find_account_by_token(&account.token)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_add_creates_exactly_one_entity() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        let outcome = favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();

        assert!(matches!(outcome, FavoriteOutcome::Added(_)));
        assert_eq!(store.entity_count(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_second_account_reuses_cache_entry() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let alice = signup(&store, "alice@x.com").await;
        let bob = signup(&store, "bob@x.com").await;

        favorites
            .add(&alice, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let outcome = favorites
            .add(&bob, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();

        // Bob's add is an Added for his ledger, but no new cache row and no
        // second upstream call.
        assert!(matches!(outcome, FavoriteOutcome::Added(_)));
        assert_eq!(store.entity_count(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_already_favorite() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let account = reload(&store, &account).await;

        let outcome = favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();

        assert!(matches!(outcome, FavoriteOutcome::AlreadyFavorite(_)));
        let account = reload(&store, &account).await;
        assert_eq!(account.favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_upstream_id() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        let err = favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, FavoriteError::NotFound(_)));
        assert_eq!(store.entity_count(), 0);
    }

    #[tokio::test]
    async fn test_list_preserves_append_order() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        for id in ["456", "123"] {
            let account = reload(&store, &account).await;
            favorites
                .add(&account, EntityKind::Comic, &UpstreamId::new(id))
                .await
                .unwrap();
        }

        let account = reload(&store, &account).await;
        let listed = favorites.list(&account).await.unwrap();
        let upstream_ids: Vec<_> = listed.iter().map(|e| e.upstream_id.as_str()).collect();
        assert_eq!(upstream_ids, vec!["456", "123"]);
    }

    #[tokio::test]
    async fn test_remove_last_reference_evicts_entity() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let account = reload(&store, &account).await;

        favorites
            .remove(&account, &UpstreamId::new("123"))
            .await
            .unwrap();

        assert_eq!(store.entity_count(), 0);
        assert!(
            store
                .find_entity_by_upstream_id(&UpstreamId::new("123"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_remove_keeps_entity_while_still_referenced() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let alice = signup(&store, "alice@x.com").await;
        let bob = signup(&store, "bob@x.com").await;

        favorites
            .add(&alice, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        favorites
            .add(&bob, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();

        let alice = reload(&store, &alice).await;
        favorites
            .remove(&alice, &UpstreamId::new("123"))
            .await
            .unwrap();

        // Bob still references the entry; it must survive the sweep.
        assert_eq!(store.entity_count(), 1);

        let bob = reload(&store, &bob).await;
        favorites.remove(&bob, &UpstreamId::new("123")).await.unwrap();
        assert_eq!(store.entity_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_non_favorite() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        // Never favorited anywhere: no cache entry at all.
        let err = favorites
            .remove(&account, &UpstreamId::new("123"))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteError::NotAFavorite));

        // Cached because someone else favorited it, but not in this ledger.
        let other = signup(&store, "b@x.com").await;
        favorites
            .add(&other, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let account = reload(&store, &account).await;
        let err = favorites
            .remove(&account, &UpstreamId::new("123"))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteError::NotAFavorite));
    }

    #[tokio::test]
    async fn test_mixed_kinds_in_one_ledger() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);
        let account = signup(&store, "a@x.com").await;

        favorites
            .add(&account, EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let account = reload(&store, &account).await;
        favorites
            .add(&account, EntityKind::Character, &UpstreamId::new("789"))
            .await
            .unwrap();

        let account = reload(&store, &account).await;
        let listed = favorites.list(&account).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(
            listed.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![EntityKind::Comic, EntityKind::Character]
        );
        assert_eq!(listed.first().map(|e| e.label.as_str()), Some("Amazing Fantasy #15"));
        assert_eq!(listed.get(1).map(|e| e.label.as_str()), Some("Spider-Man"));
    }

    #[tokio::test]
    async fn test_insert_conflict_falls_back_to_existing_row() {
        let store = MemoryStore::new();
        let source = StubSource::new();
        let favorites = FavoritesService::new(&store, &source);

        let entity = favorites
            .fetch_or_create(EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        let again = favorites
            .fetch_or_create(EntityKind::Comic, &UpstreamId::new("123"))
            .await
            .unwrap();
        assert_eq!(entity.id, again.id);
        assert_eq!(store.entity_count(), 1);
    }
}
