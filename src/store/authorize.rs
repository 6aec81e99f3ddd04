//! Authorization evaluator
//!
//! A capability check is a plain lookup against current membership rows.
//! Nothing is cached between calls: the check runs on the same connection
//! (and inside the same transaction) as the operation it guards, so a
//! membership revoked mid-flight is seen before the write lands.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, IdentityId};
use crate::entities::home::Role;

/// The unit of access the evaluator checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read rows within a home; granted to any member
    Read,
    /// Create/update/delete rows within a home; granted to any member
    Write,
    /// Home-level administration; requires the admin role
    Admin,
}

/// Look up the caller's role in a home, if any
pub(crate) fn membership_role(
    conn: &Connection,
    home_id: &EntityId,
    identity: &IdentityId,
) -> Result<Option<Role>> {
    let role: Option<String> = conn
        .query_row(
            "SELECT role FROM memberships WHERE home_id = ?1 AND identity_id = ?2",
            params![home_id.to_string(), identity.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    match role {
        None => Ok(None),
        Some(r) => Ok(Some(r.parse().map_err(Error::ConstraintViolation)?)),
    }
}

/// Evaluate a capability: `Ok(true)` is Allow, `Ok(false)` is Deny
pub(crate) fn check(
    conn: &Connection,
    identity: &IdentityId,
    home_id: &EntityId,
    capability: Capability,
) -> Result<bool> {
    let allowed = match membership_role(conn, home_id, identity)? {
        None => false,
        Some(Role::Admin) => true,
        Some(Role::Member) => !matches!(capability, Capability::Admin),
    };
    Ok(allowed)
}

/// Require a capability, failing with `Unauthorized` on deny
///
/// The error carries no entity detail, so a denial is identical whether or
/// not the named home exists.
pub(crate) fn require(
    conn: &Connection,
    identity: &IdentityId,
    home_id: &EntityId,
    capability: Capability,
) -> Result<()> {
    if check(conn, identity, home_id, capability)? {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// Require membership, failing with `NotFound` on deny
///
/// Used on the by-reference paths where rows outside the caller's homes
/// must be indistinguishable from missing rows.
pub(crate) fn require_visible(
    conn: &Connection,
    identity: &IdentityId,
    home_id: &EntityId,
    kind: crate::core::identity::EntityKind,
    entity_id: &EntityId,
) -> Result<()> {
    if membership_role(conn, home_id, identity)?.is_some() {
        Ok(())
    } else {
        Err(Error::not_found(kind, entity_id))
    }
}
