//! Storage box operations
//!
//! Boxes are one of the two audited entity kinds: every successful
//! insert/update/delete writes one audit record in the same transaction,
//! and deleting a box also audits each cascaded instance removal, with
//! the home taken from the box row as it stood before the delete.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{audit, authorize, Capability, Store};
use super::fetch_instances_in_box;
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::audit::AuditOp;
use crate::entities::storage_box::{generate_scan_token, StorageBox};

/// Partial update for a box
#[derive(Debug, Default)]
pub struct BoxUpdate {
    pub label: Option<String>,
    /// `Some(None)` clears the placement
    pub location_id: Option<Option<EntityId>>,
    pub notes: Option<Option<String>>,
    pub scan_token: Option<String>,
}

struct RawBox {
    id: String,
    home_id: String,
    location_id: Option<String>,
    label: String,
    scan_token: String,
    notes: Option<String>,
}

impl RawBox {
    fn into_box(self) -> Result<StorageBox> {
        let location_id = match self.location_id {
            Some(l) => Some(EntityId::parse(&l)?),
            None => None,
        };
        Ok(StorageBox {
            id: EntityId::parse(&self.id)?,
            home_id: EntityId::parse(&self.home_id)?,
            location_id,
            label: self.label,
            scan_token: self.scan_token,
            notes: self.notes,
        })
    }
}

fn box_from_row(row: &Row) -> rusqlite::Result<RawBox> {
    Ok(RawBox {
        id: row.get(0)?,
        home_id: row.get(1)?,
        location_id: row.get(2)?,
        label: row.get(3)?,
        scan_token: row.get(4)?,
        notes: row.get(5)?,
    })
}

const BOX_COLS: &str = "id, home_id, location_id, label, scan_token, notes";

pub(crate) fn fetch_box(conn: &Connection, id: &EntityId) -> Result<Option<StorageBox>> {
    let sql = format!("SELECT {} FROM boxes WHERE id = ?1", BOX_COLS);
    let raw = conn
        .query_row(&sql, params![id.to_string()], box_from_row)
        .optional()?;
    raw.map(RawBox::into_box).transpose()
}

pub(crate) fn fetch_boxes_in_home(
    conn: &Connection,
    home_id: &EntityId,
) -> Result<Vec<StorageBox>> {
    let sql = format!(
        "SELECT {} FROM boxes WHERE home_id = ?1 ORDER BY label",
        BOX_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![home_id.to_string()], box_from_row)?;

    let mut boxes = Vec::new();
    for raw in rows {
        boxes.push(raw?.into_box()?);
    }
    Ok(boxes)
}

/// Scan tokens are printed without tenant context, so uniqueness is global
fn check_token_free(conn: &Connection, token: &str, exclude: Option<&EntityId>) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::constraint("scan token must not be empty"));
    }
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM boxes WHERE scan_token = ?1 AND id != IFNULL(?2, ''))",
        params![token, exclude.map(|e| e.to_string())],
        |row| row.get(0),
    )?;
    if taken {
        return Err(Error::DuplicateKey {
            field: "scan token",
            value: token.to_string(),
        });
    }
    Ok(())
}

fn check_location_in_home(
    conn: &Connection,
    home_id: &EntityId,
    location_id: &EntityId,
) -> Result<()> {
    let home: Option<String> = conn
        .query_row(
            "SELECT home_id FROM locations WHERE id = ?1",
            params![location_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match home {
        Some(h) if h == home_id.to_string() => Ok(()),
        _ => Err(Error::constraint("location does not exist in this home")),
    }
}

impl Store {
    pub fn create_box(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        label: &str,
        location_id: Option<&EntityId>,
        scan_token: Option<String>,
        notes: Option<String>,
    ) -> Result<StorageBox> {
        if label.trim().is_empty() {
            return Err(Error::constraint("box label must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Write)?;
        if let Some(location) = location_id {
            check_location_in_home(&tx, home_id, location)?;
        }

        let token = scan_token.unwrap_or_else(generate_scan_token);
        check_token_free(&tx, &token, None)?;

        let storage_box = StorageBox {
            id: EntityId::new(EntityKind::Box),
            home_id: home_id.clone(),
            location_id: location_id.cloned(),
            label: label.to_string(),
            scan_token: token,
            notes,
        };
        tx.execute(
            "INSERT INTO boxes (id, home_id, location_id, label, scan_token, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                storage_box.id.to_string(),
                storage_box.home_id.to_string(),
                storage_box.location_id.as_ref().map(|l| l.to_string()),
                storage_box.label,
                storage_box.scan_token,
                storage_box.notes
            ],
        )?;
        audit::record(
            &tx,
            AuditOp::Insert,
            EntityKind::Box,
            &storage_box.id,
            Some(home_id),
            Some(caller),
            None,
            Some(audit::snapshot(&storage_box)?),
        )?;
        tx.commit()?;
        Ok(storage_box)
    }

    pub fn get_box(&self, caller: &IdentityId, id: &EntityId) -> Result<StorageBox> {
        let storage_box =
            fetch_box(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Box, id))?;
        authorize::require_visible(&self.conn, caller, &storage_box.home_id, EntityKind::Box, id)?;
        Ok(storage_box)
    }

    /// Look a box up by scanned token. The token arrives without tenant
    /// context; visibility still follows the caller's memberships.
    pub fn find_box_by_token(&self, caller: &IdentityId, token: &str) -> Result<StorageBox> {
        let sql = format!("SELECT {} FROM boxes WHERE scan_token = ?1", BOX_COLS);
        let raw = self
            .conn
            .query_row(&sql, params![token], box_from_row)
            .optional()?;
        let storage_box = match raw {
            Some(r) => r.into_box()?,
            None => {
                return Err(Error::NotFound {
                    kind: EntityKind::Box,
                    id: token.to_string(),
                })
            }
        };
        if authorize::membership_role(&self.conn, &storage_box.home_id, caller)?.is_none() {
            return Err(Error::NotFound {
                kind: EntityKind::Box,
                id: token.to_string(),
            });
        }
        Ok(storage_box)
    }

    pub fn list_boxes(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<StorageBox>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;
        fetch_boxes_in_home(&self.conn, home_id)
    }

    pub fn update_box(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        update: BoxUpdate,
    ) -> Result<StorageBox> {
        let tx = self.conn.transaction()?;
        let before = match fetch_box(&tx, id)? {
            Some(b) => b,
            None => return Err(Error::not_found(EntityKind::Box, id)),
        };
        authorize::require_visible(&tx, caller, &before.home_id, EntityKind::Box, id)?;

        let mut after = before.clone();
        if let Some(label) = update.label {
            if label.trim().is_empty() {
                return Err(Error::constraint("box label must not be empty"));
            }
            after.label = label;
        }
        if let Some(location) = update.location_id {
            if let Some(ref location_id) = location {
                check_location_in_home(&tx, &before.home_id, location_id)?;
            }
            after.location_id = location;
        }
        if let Some(notes) = update.notes {
            after.notes = notes;
        }
        if let Some(token) = update.scan_token {
            check_token_free(&tx, &token, Some(id))?;
            after.scan_token = token;
        }

        tx.execute(
            "UPDATE boxes SET location_id = ?1, label = ?2, scan_token = ?3, notes = ?4 WHERE id = ?5",
            params![
                after.location_id.as_ref().map(|l| l.to_string()),
                after.label,
                after.scan_token,
                after.notes,
                id.to_string()
            ],
        )?;
        audit::record(
            &tx,
            AuditOp::Update,
            EntityKind::Box,
            id,
            Some(&before.home_id),
            Some(caller),
            Some(audit::snapshot(&before)?),
            Some(audit::snapshot(&after)?),
        )?;
        tx.commit()?;
        Ok(after)
    }

    /// Delete a box; its instances cascade and its photos are removed
    ///
    /// Each cascaded instance delete is audited with the home resolved
    /// from the old box row, since the box is gone by the time the
    /// records are written.
    pub fn delete_box(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let before = match fetch_box(&tx, id)? {
            Some(b) => b,
            None => return Err(Error::not_found(EntityKind::Box, id)),
        };
        authorize::require_visible(&tx, caller, &before.home_id, EntityKind::Box, id)?;

        let instances = fetch_instances_in_box(&tx, id)?;

        tx.execute("DELETE FROM boxes WHERE id = ?1", params![id.to_string()])?;
        tx.execute(
            "DELETE FROM photos WHERE owner_type = 'box' AND owner_id = ?1",
            params![id.to_string()],
        )?;

        for inst in &instances {
            audit::record(
                &tx,
                AuditOp::Delete,
                EntityKind::Inst,
                &inst.id,
                Some(&before.home_id),
                Some(caller),
                Some(audit::snapshot(inst)?),
                None,
            )?;
        }
        audit::record(
            &tx,
            AuditOp::Delete,
            EntityKind::Box,
            id,
            Some(&before.home_id),
            Some(caller),
            Some(audit::snapshot(&before)?),
            None,
        )?;
        tx.commit()?;
        Ok(())
    }
}
