//! Core module - fundamental types and utilities

pub mod config;
pub mod error;
pub mod identity;

pub use config::Config;
pub use error::{Error, Result};
pub use identity::{EntityId, EntityKind, IdParseError, IdentityId};
