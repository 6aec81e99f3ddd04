//! Tenant resolver
//!
//! Derives the owning home for any entity reference. Entities carrying a
//! home column answer directly; item instances answer through their box.
//! New entity kinds attached below the home root must be added to the
//! match here rather than grow their own home columns, so the stored and
//! derivable tenant can never drift apart.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind};

/// Resolve the owning home of an entity
///
/// Fails with `NotFound` when the entity itself is absent and with
/// `DanglingReference` when a relation needed for the walk (an instance's
/// box) no longer resolves. Foreign keys should make the latter
/// impossible, but the resolver does not assume integrity.
pub(crate) fn resolve_home(conn: &Connection, kind: EntityKind, id: &EntityId) -> Result<EntityId> {
    match kind {
        EntityKind::Home => {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM homes WHERE id = ?1)",
                params![id.to_string()],
                |row| row.get(0),
            )?;
            if exists {
                Ok(id.clone())
            } else {
                Err(Error::not_found(kind, id))
            }
        }
        EntityKind::Loc => direct(conn, "locations", kind, id),
        EntityKind::Cat => direct(conn, "categories", kind, id),
        EntityKind::Box => direct(conn, "boxes", kind, id),
        EntityKind::Item => direct(conn, "items", kind, id),
        EntityKind::Phot => direct(conn, "photos", kind, id),
        EntityKind::Inst => {
            let box_id: Option<String> = conn
                .query_row(
                    "SELECT box_id FROM instances WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let box_id = box_id.ok_or_else(|| Error::not_found(kind, id))?;
            let home: Option<String> = conn
                .query_row(
                    "SELECT home_id FROM boxes WHERE id = ?1",
                    params![&box_id],
                    |row| row.get(0),
                )
                .optional()?;
            match home {
                Some(h) => Ok(EntityId::parse(&h)?),
                None => Err(Error::dangling(EntityKind::Box, box_id)),
            }
        }
        EntityKind::Aud => {
            // Null-home audit rows are un-attributable and stay invisible
            let home: Option<Option<String>> = conn
                .query_row(
                    "SELECT home_id FROM audit_log WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            match home {
                None => Err(Error::not_found(kind, id)),
                Some(None) => Err(Error::not_found(kind, id)),
                Some(Some(h)) => Ok(EntityId::parse(&h)?),
            }
        }
    }
}

/// Resolution for the audit interceptor: degrade failure to `None`
/// (audit completeness over audit precision; the business mutation is
/// never aborted for an unresolvable tenant)
pub(crate) fn resolve_home_or_null(
    conn: &Connection,
    kind: EntityKind,
    id: &EntityId,
) -> Option<EntityId> {
    resolve_home(conn, kind, id).ok()
}

fn direct(conn: &Connection, table: &str, kind: EntityKind, id: &EntityId) -> Result<EntityId> {
    // Table names come from the match above, never from input
    let sql = format!("SELECT home_id FROM {} WHERE id = ?1", table);
    let home: Option<String> = conn
        .query_row(&sql, params![id.to_string()], |row| row.get(0))
        .optional()?;
    match home {
        Some(h) => Ok(EntityId::parse(&h)?),
        None => Err(Error::not_found(kind, id)),
    }
}
