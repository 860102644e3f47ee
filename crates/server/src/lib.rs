//! Comic vault backend.
//!
//! A small API server that registers accounts, authenticates them with
//! opaque bearer tokens, proxies a third-party comics/characters API and
//! keeps a per-account favorites ledger deduplicated against a local
//! entity cache.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in/out
//! - `PostgreSQL` for accounts and the entity cache ([`store::postgres`]),
//!   with an in-memory store for tests and local development
//! - Upstream Marvel-style API behind the [`upstream::UpstreamSource`] seam

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod upstream;
