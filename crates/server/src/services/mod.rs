//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account signup, login and bearer-token resolution
//! - `favorites` - The favorites ledger, the lazy entity cache and the
//!   orphan sweep that evicts unreferenced cache entries

pub mod auth;
pub mod favorites;
