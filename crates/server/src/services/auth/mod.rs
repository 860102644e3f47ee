//! Authentication service.
//!
//! Accounts carry a salted SHA-256 password hash and an opaque bearer token
//! minted at signup. The token is the account's only credential for
//! subsequent requests: it never expires and is never rotated.

mod error;

pub use error::AuthError;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use comicvault_core::Email;

use crate::models::{Account, NewAccount};
use crate::store::{Store, StoreError};

/// Bytes of entropy in a password salt.
const SALT_BYTES: usize = 16;

/// Bytes of entropy in a bearer token.
const TOKEN_BYTES: usize = 64;

/// Authentication service.
///
/// Handles signup, login and bearer-token resolution.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new account and mint its bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::EmptyPassword` if the password is empty.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let salt = random_string(SALT_BYTES);
        let hash = hash_password(password, &salt);
        let token = random_string(TOKEN_BYTES);

        let account = self
            .store
            .create_account(NewAccount {
                email,
                salt,
                hash,
                token,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        Ok(account)
    }

    /// Login with email and password.
    ///
    /// Recomputes the hash from the stored salt and compares. Unknown email
    /// and wrong password both yield `AuthError::InvalidCredentials` so a
    /// caller cannot probe for registered addresses.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyPassword` if the password is empty.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        // A malformed email cannot belong to any account; same error as an
        // unknown one.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .store
            .find_account_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if hash_password(password, &account.salt) != account.hash {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Resolve a bearer token to its account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if no account carries the token.
    pub async fn resolve_token(&self, token: &str) -> Result<Account, AuthError> {
        self.store
            .find_account_by_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Generate a URL-safe random string carrying `n_bytes` of entropy.
fn random_string(n_bytes: usize) -> String {
    let mut buf = vec![0u8; n_bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Hash a password: base64(SHA-256(password ‖ salt)).
fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}
