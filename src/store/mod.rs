//! SQLite-backed inventory store
//!
//! This module is the core of the system:
//! - Tenancy: homes and memberships ([`tenancy`])
//! - The entity graph: locations, categories, boxes, items, instances,
//!   photos ([`graph`])
//! - Tenant resolution for entities that do not store their home ([`resolver`])
//! - Capability checks against current membership rows ([`authorize`])
//! - The audit trail written inside the mutating transaction ([`audit`])
//!
//! Every mutating operation runs as one `rusqlite` transaction containing
//! the authorization check, the mutation, the audit record, and the
//! timestamp stamp. Either all of them commit or none do; a membership
//! revoked mid-flight is seen because the check reads current rows inside
//! that same transaction.

mod audit;
mod authorize;
mod graph;
mod resolver;
mod schema;
mod tenancy;

pub use authorize::Capability;
pub use graph::{BoxUpdate, InstanceUpdate, LocationUpdate};

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;

use crate::core::error::{Error, Result};

/// Current schema version - opening a database written by a different
/// version is refused (migrations are out of scope)
const SCHEMA_VERSION: i32 = 1;

/// The inventory store backed by SQLite
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    /// Open or create an inventory database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::constraint(format!("cannot create {:?}: {}", parent, e)))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory store (used by tests)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // WAL for concurrent readers; foreign keys drive the cascade rules
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let mut store = Self { conn };
        match store.stored_schema_version()? {
            None => store.init_schema()?,
            Some(v) if v == SCHEMA_VERSION => {}
            Some(v) => {
                return Err(Error::constraint(format!(
                    "unsupported schema version {} (expected {})",
                    v, SCHEMA_VERSION
                )))
            }
        }
        Ok(store)
    }

    fn stored_schema_version(&self) -> Result<Option<i32>> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }
        let version = self
            .conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;
        Ok(Some(version))
    }
}

/// Parse a stored RFC 3339 timestamp, tolerating corrupt values
pub(crate) fn parse_datetime(s: String) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
}

/// Case-insensitive normalization for per-home unique names
///
/// SQLite's NOCASE collation folds ASCII only, so the Unicode-aware fold
/// happens here and is persisted in a `name_norm` column.
pub(crate) fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests;
