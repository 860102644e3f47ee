//! Core types for Comicvault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod kind;
pub mod upstream;

pub use email::{Email, EmailError};
pub use id::*;
pub use kind::{EntityKind, EntityKindError};
pub use upstream::UpstreamId;
