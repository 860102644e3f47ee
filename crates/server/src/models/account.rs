//! Account model.

use chrono::{DateTime, Utc};

use comicvault_core::{AccountId, Email, EntityId};

/// A registered account.
///
/// `salt`, `hash` and `token` are credential material: this type deliberately
/// does not implement `Serialize`. Routes build their own response bodies and
/// only ever expose the bearer token itself (on signup/login).
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    /// Random salt mixed into the password hash.
    pub salt: String,
    /// base64(SHA-256(password ‖ salt)).
    pub hash: String,
    /// Opaque bearer token. Static for the account's lifetime; no expiry.
    pub token: String,
    /// References into the entity cache, in append order. No duplicates.
    pub favorites: Vec<EntityId>,
    pub created_at: DateTime<Utc>,
}

/// Credential material for an account about to be created.
#[derive(Debug)]
pub struct NewAccount {
    pub email: Email,
    pub salt: String,
    pub hash: String,
    pub token: String,
}
