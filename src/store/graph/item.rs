//! Item operations
//!
//! Item names share the per-home case-insensitive uniqueness rule with
//! categories. Deleting an item cascades its instances; those cascaded
//! removals are audited like any other instance delete.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{audit, authorize, normalize_name, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::audit::AuditOp;
use crate::entities::item::Item;

struct RawItem {
    id: String,
    home_id: String,
    name: String,
    category_id: Option<String>,
}

impl RawItem {
    fn into_item(self) -> Result<Item> {
        let category_id = match self.category_id {
            Some(c) => Some(EntityId::parse(&c)?),
            None => None,
        };
        Ok(Item {
            id: EntityId::parse(&self.id)?,
            home_id: EntityId::parse(&self.home_id)?,
            name: self.name,
            category_id,
        })
    }
}

fn item_from_row(row: &Row) -> rusqlite::Result<RawItem> {
    Ok(RawItem {
        id: row.get(0)?,
        home_id: row.get(1)?,
        name: row.get(2)?,
        category_id: row.get(3)?,
    })
}

pub(super) fn fetch_item(conn: &Connection, id: &EntityId) -> Result<Option<Item>> {
    let raw = conn
        .query_row(
            "SELECT id, home_id, name, category_id FROM items WHERE id = ?1",
            params![id.to_string()],
            item_from_row,
        )
        .optional()?;
    raw.map(RawItem::into_item).transpose()
}

fn check_name_free(
    conn: &Connection,
    home_id: &EntityId,
    name: &str,
    exclude: Option<&EntityId>,
) -> Result<()> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM items
         WHERE home_id = ?1 AND name_norm = ?2 AND id != IFNULL(?3, ''))",
        params![
            home_id.to_string(),
            normalize_name(name),
            exclude.map(|e| e.to_string())
        ],
        |row| row.get(0),
    )?;
    if taken {
        return Err(Error::DuplicateKey {
            field: "item name",
            value: name.to_string(),
        });
    }
    Ok(())
}

fn check_category_in_home(
    conn: &Connection,
    home_id: &EntityId,
    category_id: &EntityId,
) -> Result<()> {
    let home: Option<String> = conn
        .query_row(
            "SELECT home_id FROM categories WHERE id = ?1",
            params![category_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match home {
        Some(h) if h == home_id.to_string() => Ok(()),
        _ => Err(Error::constraint("category does not exist in this home")),
    }
}

impl Store {
    pub fn create_item(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        name: &str,
        category_id: Option<&EntityId>,
    ) -> Result<Item> {
        if name.trim().is_empty() {
            return Err(Error::constraint("item name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Write)?;
        check_name_free(&tx, home_id, name, None)?;
        if let Some(category) = category_id {
            check_category_in_home(&tx, home_id, category)?;
        }

        let item = Item {
            id: EntityId::new(EntityKind::Item),
            home_id: home_id.clone(),
            name: name.to_string(),
            category_id: category_id.cloned(),
        };
        tx.execute(
            "INSERT INTO items (id, home_id, name, name_norm, category_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id.to_string(),
                item.home_id.to_string(),
                item.name,
                normalize_name(&item.name),
                item.category_id.as_ref().map(|c| c.to_string())
            ],
        )?;
        tx.commit()?;
        Ok(item)
    }

    pub fn get_item(&self, caller: &IdentityId, id: &EntityId) -> Result<Item> {
        let item =
            fetch_item(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Item, id))?;
        authorize::require_visible(&self.conn, caller, &item.home_id, EntityKind::Item, id)?;
        Ok(item)
    }

    pub fn list_items(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<Item>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, home_id, name, category_id FROM items
             WHERE home_id = ?1 ORDER BY name_norm",
        )?;
        let rows = stmt.query_map(params![home_id.to_string()], item_from_row)?;

        let mut items = Vec::new();
        for raw in rows {
            items.push(raw?.into_item()?);
        }
        Ok(items)
    }

    pub fn update_item(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        name: Option<&str>,
        category_id: Option<Option<&EntityId>>,
    ) -> Result<Item> {
        let tx = self.conn.transaction()?;
        let mut item = match fetch_item(&tx, id)? {
            Some(i) => i,
            None => return Err(Error::not_found(EntityKind::Item, id)),
        };
        authorize::require_visible(&tx, caller, &item.home_id, EntityKind::Item, id)?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(Error::constraint("item name must not be empty"));
            }
            check_name_free(&tx, &item.home_id, name, Some(id))?;
            item.name = name.to_string();
        }
        if let Some(category) = category_id {
            if let Some(category_id) = category {
                check_category_in_home(&tx, &item.home_id, category_id)?;
            }
            item.category_id = category.cloned();
        }

        tx.execute(
            "UPDATE items SET name = ?1, name_norm = ?2, category_id = ?3 WHERE id = ?4",
            params![
                item.name,
                normalize_name(&item.name),
                item.category_id.as_ref().map(|c| c.to_string()),
                id.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(item)
    }

    /// Delete an item; its instances cascade and each removal is audited
    pub fn delete_item(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let item = match fetch_item(&tx, id)? {
            Some(i) => i,
            None => return Err(Error::not_found(EntityKind::Item, id)),
        };
        authorize::require_visible(&tx, caller, &item.home_id, EntityKind::Item, id)?;

        let instances = super::instance::fetch_instances_of_item(&tx, id)?;

        tx.execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])?;
        tx.execute(
            "DELETE FROM photos WHERE owner_type = 'item' AND owner_id = ?1",
            params![id.to_string()],
        )?;

        for inst in &instances {
            audit::record(
                &tx,
                AuditOp::Delete,
                EntityKind::Inst,
                &inst.id,
                Some(&item.home_id),
                Some(caller),
                Some(audit::snapshot(inst)?),
                None,
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
