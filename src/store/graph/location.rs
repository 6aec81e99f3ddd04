//! Location tree operations
//!
//! Parents must live in the same home and the chain above a node must stay
//! acyclic; both are checked inside the mutating transaction. Deleting a
//! node cascades through its subtree; boxes standing at a removed location
//! keep existing with their location cleared.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{authorize, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::location::{Location, LocationKind};

/// Partial update for a location
#[derive(Debug, Default)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    /// `Some(None)` detaches the node to the forest root
    pub parent_id: Option<Option<EntityId>>,
}

struct RawLocation {
    id: String,
    home_id: String,
    kind: String,
    parent_id: Option<String>,
    name: String,
}

impl RawLocation {
    fn into_location(self) -> Result<Location> {
        let parent_id = match self.parent_id {
            Some(p) => Some(EntityId::parse(&p)?),
            None => None,
        };
        Ok(Location {
            id: EntityId::parse(&self.id)?,
            home_id: EntityId::parse(&self.home_id)?,
            kind: self.kind.parse().map_err(Error::ConstraintViolation)?,
            parent_id,
            name: self.name,
        })
    }
}

fn location_from_row(row: &Row) -> rusqlite::Result<RawLocation> {
    Ok(RawLocation {
        id: row.get(0)?,
        home_id: row.get(1)?,
        kind: row.get(2)?,
        parent_id: row.get(3)?,
        name: row.get(4)?,
    })
}

fn fetch_location(conn: &Connection, id: &EntityId) -> Result<Option<Location>> {
    let raw = conn
        .query_row(
            "SELECT id, home_id, kind, parent_id, name FROM locations WHERE id = ?1",
            params![id.to_string()],
            location_from_row,
        )
        .optional()?;
    raw.map(RawLocation::into_location).transpose()
}

/// Check that a prospective parent is usable: present, in the same home,
/// and not part of a chain that loops back to `child`
fn validate_parent(
    conn: &Connection,
    home_id: &EntityId,
    child: Option<&EntityId>,
    parent_id: &EntityId,
) -> Result<()> {
    let parent = fetch_location(conn, parent_id)?
        .ok_or_else(|| Error::constraint("parent location does not exist in this home"))?;
    if &parent.home_id != home_id {
        // Same message as missing: cross-home rows must stay invisible
        return Err(Error::constraint("parent location does not exist in this home"));
    }

    if let Some(child_id) = child {
        let mut cursor = Some(parent_id.clone());
        while let Some(current) = cursor {
            if &current == child_id {
                return Err(Error::constraint("location parent would create a cycle"));
            }
            cursor = match fetch_location(conn, &current)? {
                Some(loc) => loc.parent_id,
                None => None,
            };
        }
    }
    Ok(())
}

impl Store {
    pub fn create_location(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        kind: LocationKind,
        parent_id: Option<&EntityId>,
        name: &str,
    ) -> Result<Location> {
        if name.trim().is_empty() {
            return Err(Error::constraint("location name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Write)?;
        if let Some(parent) = parent_id {
            validate_parent(&tx, home_id, None, parent)?;
        }

        let location = Location {
            id: EntityId::new(EntityKind::Loc),
            home_id: home_id.clone(),
            kind,
            parent_id: parent_id.cloned(),
            name: name.to_string(),
        };
        tx.execute(
            "INSERT INTO locations (id, home_id, kind, parent_id, name) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                location.id.to_string(),
                location.home_id.to_string(),
                location.kind.to_string(),
                location.parent_id.as_ref().map(|p| p.to_string()),
                location.name
            ],
        )?;
        tx.commit()?;
        Ok(location)
    }

    pub fn get_location(&self, caller: &IdentityId, id: &EntityId) -> Result<Location> {
        let location =
            fetch_location(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Loc, id))?;
        authorize::require_visible(&self.conn, caller, &location.home_id, EntityKind::Loc, id)?;
        Ok(location)
    }

    pub fn list_locations(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<Location>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, home_id, kind, parent_id, name FROM locations
             WHERE home_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![home_id.to_string()], location_from_row)?;

        let mut locations = Vec::new();
        for raw in rows {
            locations.push(raw?.into_location()?);
        }
        Ok(locations)
    }

    pub fn update_location(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        update: LocationUpdate,
    ) -> Result<Location> {
        let tx = self.conn.transaction()?;
        let mut location =
            match fetch_location(&tx, id)? {
                Some(l) => l,
                None => return Err(Error::not_found(EntityKind::Loc, id)),
            };
        authorize::require_visible(&tx, caller, &location.home_id, EntityKind::Loc, id)?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(Error::constraint("location name must not be empty"));
            }
            location.name = name;
        }
        if let Some(kind) = update.kind {
            location.kind = kind;
        }
        if let Some(parent) = update.parent_id {
            if let Some(ref parent_id) = parent {
                validate_parent(&tx, &location.home_id, Some(id), parent_id)?;
            }
            location.parent_id = parent;
        }

        tx.execute(
            "UPDATE locations SET kind = ?1, parent_id = ?2, name = ?3 WHERE id = ?4",
            params![
                location.kind.to_string(),
                location.parent_id.as_ref().map(|p| p.to_string()),
                location.name,
                id.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(location)
    }

    /// Delete a location and its whole subtree
    pub fn delete_location(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let location = match fetch_location(&tx, id)? {
            Some(l) => l,
            None => return Err(Error::not_found(EntityKind::Loc, id)),
        };
        authorize::require_visible(&tx, caller, &location.home_id, EntityKind::Loc, id)?;

        // Subtree cascades via the self-referential FK; boxes get their
        // location_id cleared by ON DELETE SET NULL (not a user mutation,
        // so no box audit record)
        tx.execute("DELETE FROM locations WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}
