//! Error taxonomy for the inventory core
//!
//! Every kind is stable and surfaced to callers as-is; nothing is retried
//! here. The single deliberate exception to "never swallow" lives in the
//! audit interceptor, which degrades a failed tenant resolution to a
//! null-tenant record instead of failing the caller's mutation.

use thiserror::Error;

use crate::core::identity::{EntityKind, IdParseError};

#[derive(Debug, Error)]
pub enum Error {
    /// Capability check failed. Carries no entity detail so a denial can
    /// never confirm that the denied resource exists.
    #[error("unauthorized")]
    Unauthorized,

    /// Entity or home absent, or invisible to the caller. Row-filter
    /// semantics: rows outside the caller's homes look exactly like
    /// missing rows.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Uniqueness violation (per-home case-insensitive names, global scan
    /// tokens, one membership per identity per home).
    #[error("duplicate {field}: '{value}'")]
    DuplicateKey { field: &'static str, value: String },

    /// A relation needed for tenant resolution points at a row that no
    /// longer exists.
    #[error("dangling reference: {kind} {id}")]
    DanglingReference { kind: EntityKind, id: String },

    /// Invalid payload: negative quantity, unknown enum value, cyclic or
    /// cross-home location parent, and the like.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid id: {0}")]
    Id(#[from] IdParseError),

    #[error("storage error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn dangling(kind: EntityKind, id: impl ToString) -> Self {
        Error::DanglingReference {
            kind,
            id: id.to_string(),
        }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Error::ConstraintViolation(msg.into())
    }
}
