//! Shared command helpers

use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::core::Config;
use crate::store::Store;

/// Open the store named by flags, environment, config, or the default path
pub fn open_store(global: &GlobalOpts) -> Result<Store> {
    let config = Config::load();
    let path = global
        .db
        .clone()
        .or(config.database)
        .unwrap_or_else(Config::default_database_path);
    Store::open(&path).into_diagnostic()
}

/// Resolve the acting identity; every command requires one
pub fn caller(global: &GlobalOpts) -> Result<IdentityId> {
    let config = Config::load();
    global
        .identity
        .clone()
        .or(config.identity)
        .map(IdentityId::new)
        .ok_or_else(|| {
            miette::miette!(
                "no acting identity: pass --as <identity>, set BOXROOM_IDENTITY, or configure 'identity'"
            )
        })
}

/// Parse an entity id argument, requiring the expected kind
pub fn parse_id(s: &str, kind: EntityKind) -> Result<EntityId> {
    EntityId::parse_as(s, kind).into_diagnostic()
}

/// Render an optional cell for table output
pub fn opt_cell<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
