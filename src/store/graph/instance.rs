//! Item instance operations
//!
//! Instances never store a home column; every authorization check resolves
//! the home through the instance's box. Updates run the timestamp
//! interceptor (updated_at is stamped by the store, caller values are
//! ignored by construction) and, like boxes, every mutation is audited in
//! the same transaction.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{audit, authorize, parse_datetime, resolver, Capability, Store};
use super::{boxes, item};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::audit::AuditOp;
use crate::entities::instance::{InstanceStatus, ItemInstance};

/// Partial update for an instance
///
/// There is deliberately no timestamp field here: recency cannot be forged
/// because the store stamps `updated_at` itself on every update.
#[derive(Debug, Default)]
pub struct InstanceUpdate {
    pub box_id: Option<EntityId>,
    pub quantity: Option<i64>,
    pub status: Option<InstanceStatus>,
    pub sale_price: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

struct RawInstance {
    id: String,
    item_id: String,
    box_id: String,
    quantity: i64,
    status: String,
    sale_price: Option<f64>,
    notes: Option<String>,
    updated_at: String,
}

impl RawInstance {
    fn into_instance(self) -> Result<ItemInstance> {
        Ok(ItemInstance {
            id: EntityId::parse(&self.id)?,
            item_id: EntityId::parse(&self.item_id)?,
            box_id: EntityId::parse(&self.box_id)?,
            quantity: self.quantity,
            status: self.status.parse().map_err(Error::ConstraintViolation)?,
            sale_price: self.sale_price,
            notes: self.notes,
            updated_at: parse_datetime(self.updated_at),
        })
    }
}

fn instance_from_row(row: &Row) -> rusqlite::Result<RawInstance> {
    Ok(RawInstance {
        id: row.get(0)?,
        item_id: row.get(1)?,
        box_id: row.get(2)?,
        quantity: row.get(3)?,
        status: row.get(4)?,
        sale_price: row.get(5)?,
        notes: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const INSTANCE_COLS: &str = "id, item_id, box_id, quantity, status, sale_price, notes, updated_at";

fn fetch_instance(conn: &Connection, id: &EntityId) -> Result<Option<ItemInstance>> {
    let sql = format!("SELECT {} FROM instances WHERE id = ?1", INSTANCE_COLS);
    let raw = conn
        .query_row(&sql, params![id.to_string()], instance_from_row)
        .optional()?;
    raw.map(RawInstance::into_instance).transpose()
}

pub(crate) fn fetch_instances_in_box(
    conn: &Connection,
    box_id: &EntityId,
) -> Result<Vec<ItemInstance>> {
    let sql = format!(
        "SELECT {} FROM instances WHERE box_id = ?1 ORDER BY id",
        INSTANCE_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![box_id.to_string()], instance_from_row)?;

    let mut instances = Vec::new();
    for raw in rows {
        instances.push(raw?.into_instance()?);
    }
    Ok(instances)
}

pub(super) fn fetch_instances_of_item(
    conn: &Connection,
    item_id: &EntityId,
) -> Result<Vec<ItemInstance>> {
    let sql = format!(
        "SELECT {} FROM instances WHERE item_id = ?1 ORDER BY id",
        INSTANCE_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![item_id.to_string()], instance_from_row)?;

    let mut instances = Vec::new();
    for raw in rows {
        instances.push(raw?.into_instance()?);
    }
    Ok(instances)
}

fn check_quantity(quantity: i64) -> Result<()> {
    if quantity < 0 {
        return Err(Error::constraint("quantity must not be negative"));
    }
    Ok(())
}

impl Store {
    /// Place an item in a box
    ///
    /// The owning home derives from the box; the item must belong to the
    /// same home, which is the guard against stitching two tenants
    /// together through an instance row.
    pub fn create_instance(
        &mut self,
        caller: &IdentityId,
        item_id: &EntityId,
        box_id: &EntityId,
        quantity: i64,
        status: InstanceStatus,
        sale_price: Option<f64>,
        notes: Option<String>,
    ) -> Result<ItemInstance> {
        check_quantity(quantity)?;

        let tx = self.conn.transaction()?;
        let storage_box = boxes::fetch_box(&tx, box_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Box, box_id))?;
        authorize::require_visible(&tx, caller, &storage_box.home_id, EntityKind::Box, box_id)?;

        let item = item::fetch_item(&tx, item_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Item, item_id))?;
        if item.home_id != storage_box.home_id {
            return Err(Error::constraint("item and box belong to different homes"));
        }

        let instance = ItemInstance {
            id: EntityId::new(EntityKind::Inst),
            item_id: item_id.clone(),
            box_id: box_id.clone(),
            quantity,
            status,
            sale_price,
            notes,
            updated_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO instances (id, item_id, box_id, quantity, status, sale_price, notes, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                instance.id.to_string(),
                instance.item_id.to_string(),
                instance.box_id.to_string(),
                instance.quantity,
                instance.status.to_string(),
                instance.sale_price,
                instance.notes,
                instance.updated_at.to_rfc3339()
            ],
        )?;
        audit::record(
            &tx,
            AuditOp::Insert,
            EntityKind::Inst,
            &instance.id,
            resolver::resolve_home_or_null(&tx, EntityKind::Inst, &instance.id).as_ref(),
            Some(caller),
            None,
            Some(audit::snapshot(&instance)?),
        )?;
        tx.commit()?;
        Ok(instance)
    }

    pub fn get_instance(&self, caller: &IdentityId, id: &EntityId) -> Result<ItemInstance> {
        let instance =
            fetch_instance(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Inst, id))?;
        let home = resolver::resolve_home(&self.conn, EntityKind::Inst, id)?;
        authorize::require_visible(&self.conn, caller, &home, EntityKind::Inst, id)?;
        Ok(instance)
    }

    /// List a home's instances, optionally narrowed to one box
    pub fn list_instances(
        &self,
        caller: &IdentityId,
        home_id: &EntityId,
        box_id: Option<&EntityId>,
    ) -> Result<Vec<ItemInstance>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let sql = format!(
            "SELECT i.id, i.item_id, i.box_id, i.quantity, i.status, i.sale_price, i.notes, i.updated_at
             FROM instances i
             JOIN boxes b ON b.id = i.box_id
             WHERE b.home_id = ?1 AND (?2 IS NULL OR i.box_id = ?2)
             ORDER BY i.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![home_id.to_string(), box_id.map(|b| b.to_string())],
            instance_from_row,
        )?;

        let mut instances = Vec::new();
        for raw in rows {
            instances.push(raw?.into_instance()?);
        }
        Ok(instances)
    }

    pub fn update_instance(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        update: InstanceUpdate,
    ) -> Result<ItemInstance> {
        let tx = self.conn.transaction()?;
        let before = match fetch_instance(&tx, id)? {
            Some(i) => i,
            None => return Err(Error::not_found(EntityKind::Inst, id)),
        };
        let home = resolver::resolve_home(&tx, EntityKind::Inst, id)?;
        authorize::require_visible(&tx, caller, &home, EntityKind::Inst, id)?;

        let mut after = before.clone();
        if let Some(box_id) = update.box_id {
            let target = boxes::fetch_box(&tx, &box_id)?
                .ok_or_else(|| Error::not_found(EntityKind::Box, &box_id))?;
            // The item anchors the instance's home; a box in another home
            // would silently re-tenant the row
            if target.home_id != home {
                return Err(Error::constraint("target box belongs to a different home"));
            }
            after.box_id = box_id;
        }
        if let Some(quantity) = update.quantity {
            check_quantity(quantity)?;
            after.quantity = quantity;
        }
        if let Some(status) = update.status {
            after.status = status;
        }
        if let Some(sale_price) = update.sale_price {
            after.sale_price = sale_price;
        }
        if let Some(notes) = update.notes {
            after.notes = notes;
        }

        // Timestamp interceptor: always the store's clock
        after.updated_at = Utc::now();

        tx.execute(
            "UPDATE instances SET box_id = ?1, quantity = ?2, status = ?3, sale_price = ?4, notes = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                after.box_id.to_string(),
                after.quantity,
                after.status.to_string(),
                after.sale_price,
                after.notes,
                after.updated_at.to_rfc3339(),
                id.to_string()
            ],
        )?;
        audit::record(
            &tx,
            AuditOp::Update,
            EntityKind::Inst,
            id,
            resolver::resolve_home_or_null(&tx, EntityKind::Inst, id).as_ref(),
            Some(caller),
            Some(audit::snapshot(&before)?),
            Some(audit::snapshot(&after)?),
        )?;
        tx.commit()?;
        Ok(after)
    }

    pub fn delete_instance(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let before = match fetch_instance(&tx, id)? {
            Some(i) => i,
            None => return Err(Error::not_found(EntityKind::Inst, id)),
        };
        // Resolve through the box reference the row held before deletion
        let home = resolver::resolve_home(&tx, EntityKind::Inst, id)?;
        authorize::require_visible(&tx, caller, &home, EntityKind::Inst, id)?;

        tx.execute(
            "DELETE FROM instances WHERE id = ?1",
            params![id.to_string()],
        )?;
        audit::record(
            &tx,
            AuditOp::Delete,
            EntityKind::Inst,
            id,
            Some(&home),
            Some(caller),
            Some(audit::snapshot(&before)?),
            None,
        )?;
        tx.commit()?;
        Ok(())
    }
}
