//! In-memory implementation of the [`Store`] trait.
//!
//! Backs the unit and router-level test suites, and allows running the
//! server locally without a database. Semantics mirror `PgStore`, including
//! the unique constraints on account email and entity upstream id.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use comicvault_core::{AccountId, Email, EntityId, UpstreamId};

use super::{Store, StoreError};
use crate::models::{Account, CachedEntity, NewAccount, NewEntity};

#[derive(Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    entities: HashMap<EntityId, CachedEntity>,
}

/// Store keeping both collections in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of cached entities. Test helper.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.read().entities.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.write();

        if inner.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("email already registered".to_owned()));
        }

        let created = Account {
            id: AccountId::generate(),
            email: account.email,
            salt: account.salt,
            hash: account.hash,
            token: account.token,
            favorites: Vec::new(),
            created_at: Utc::now(),
        };
        inner.accounts.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()
            .accounts
            .values()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn find_account_by_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()
            .accounts
            .values()
            .find(|a| a.token == token)
            .cloned())
    }

    async fn update_favorites(
        &self,
        account_id: AccountId,
        favorites: &[EntityId],
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        let account = inner
            .accounts
            .get_mut(&account_id)
            .ok_or(StoreError::NotFound)?;
        account.favorites = favorites.to_vec();
        Ok(())
    }

    async fn insert_entity(&self, entity: NewEntity) -> Result<CachedEntity, StoreError> {
        let mut inner = self.write();

        if inner
            .entities
            .values()
            .any(|e| e.upstream_id == entity.upstream_id)
        {
            return Err(StoreError::Conflict("entity already cached".to_owned()));
        }

        let created = CachedEntity {
            id: EntityId::generate(),
            upstream_id: entity.upstream_id,
            kind: entity.kind,
            label: entity.label,
            description: entity.description,
            thumbnail: entity.thumbnail,
            created_at: Utc::now(),
        };
        inner.entities.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_entity_by_upstream_id(
        &self,
        upstream_id: &UpstreamId,
    ) -> Result<Option<CachedEntity>, StoreError> {
        Ok(self
            .read()
            .entities
            .values()
            .find(|e| e.upstream_id == *upstream_id)
            .cloned())
    }

    async fn get_entities(&self, ids: &[EntityId]) -> Result<Vec<CachedEntity>, StoreError> {
        let inner = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.entities.get(id).cloned())
            .collect())
    }

    async fn is_entity_referenced(&self, id: EntityId) -> Result<bool, StoreError> {
        Ok(self
            .read()
            .accounts
            .values()
            .any(|a| a.favorites.contains(&id)))
    }

    async fn delete_entity(&self, id: EntityId) -> Result<(), StoreError> {
        self.write().entities.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use comicvault_core::EntityKind;

    use super::*;
    use crate::models::Thumbnail;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: Email::parse(email).unwrap(),
            salt: "salt".to_owned(),
            hash: "hash".to_owned(),
            token: format!("token-{email}"),
        }
    }

    fn new_entity(upstream_id: &str) -> NewEntity {
        NewEntity {
            upstream_id: UpstreamId::new(upstream_id),
            kind: EntityKind::Comic,
            label: "Test Comic".to_owned(),
            description: None,
            thumbnail: Thumbnail {
                path: "http://img.example/x".to_owned(),
                extension: "jpg".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_account(new_account("a@x.com")).await.unwrap();

        let err = store
            .create_account(new_account("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_upstream_id_conflicts() {
        let store = MemoryStore::new();
        store.insert_entity(new_entity("123")).await.unwrap();

        let err = store.insert_entity(new_entity("123")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_lookup() {
        let store = MemoryStore::new();
        let created = store.create_account(new_account("a@x.com")).await.unwrap();

        let found = store
            .find_account_by_token(&created.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(
            store
                .find_account_by_token("unknown")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_get_entities_preserves_input_order() {
        let store = MemoryStore::new();
        let a = store.insert_entity(new_entity("1")).await.unwrap();
        let b = store.insert_entity(new_entity("2")).await.unwrap();
        let c = store.insert_entity(new_entity("3")).await.unwrap();

        let listed = store.get_entities(&[c.id, a.id, b.id]).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
    }

    #[tokio::test]
    async fn test_get_entities_skips_missing() {
        let store = MemoryStore::new();
        let a = store.insert_entity(new_entity("1")).await.unwrap();
        let ghost = EntityId::generate();

        let listed = store.get_entities(&[ghost, a.id]).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().map(|e| e.id), Some(a.id));
    }

    #[tokio::test]
    async fn test_reference_scan() {
        let store = MemoryStore::new();
        let account = store.create_account(new_account("a@x.com")).await.unwrap();
        let entity = store.insert_entity(new_entity("1")).await.unwrap();

        assert!(!store.is_entity_referenced(entity.id).await.unwrap());

        store
            .update_favorites(account.id, &[entity.id])
            .await
            .unwrap();
        assert!(store.is_entity_referenced(entity.id).await.unwrap());

        store.update_favorites(account.id, &[]).await.unwrap();
        assert!(!store.is_entity_referenced(entity.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_favorites_unknown_account() {
        let store = MemoryStore::new();
        let err = store
            .update_favorites(AccountId::generate(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
