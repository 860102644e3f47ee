//! Domain models for the Comicvault server.

pub mod account;
pub mod entity;

pub use account::{Account, NewAccount};
pub use entity::{CachedEntity, NewEntity, Thumbnail};
