//! Comicvault Core - Shared types library.
//!
//! This crate provides common types used by the Comicvault server:
//! type-safe IDs, validated email addresses, entity kinds and upstream keys.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
