//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format (signup only; login folds this into
    /// `InvalidCredentials`).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] comicvault_core::EmailError),

    /// Empty password in a signup or login body.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Invalid credentials (unknown email or wrong password - callers must
    /// not be able to tell which).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token did not resolve to an account.
    #[error("invalid bearer token")]
    InvalidToken,

    /// Email already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Store/database error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
