//! Category operations
//!
//! Names are unique per home under Unicode lowercasing; the normalized
//! form is checked inside the transaction and persisted with a UNIQUE
//! index as backstop, so "Câbles" and "câbles" cannot coexist.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{authorize, normalize_name, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::category::Category;

struct RawCategory {
    id: String,
    home_id: String,
    name: String,
}

impl RawCategory {
    fn into_category(self) -> Result<Category> {
        Ok(Category {
            id: EntityId::parse(&self.id)?,
            home_id: EntityId::parse(&self.home_id)?,
            name: self.name,
        })
    }
}

fn category_from_row(row: &Row) -> rusqlite::Result<RawCategory> {
    Ok(RawCategory {
        id: row.get(0)?,
        home_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn fetch_category(conn: &Connection, id: &EntityId) -> Result<Option<Category>> {
    let raw = conn
        .query_row(
            "SELECT id, home_id, name FROM categories WHERE id = ?1",
            params![id.to_string()],
            category_from_row,
        )
        .optional()?;
    raw.map(RawCategory::into_category).transpose()
}

/// Reject a write whose normalized name is already taken in this home
fn check_name_free(
    conn: &Connection,
    home_id: &EntityId,
    name: &str,
    exclude: Option<&EntityId>,
) -> Result<()> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories
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
            field: "category name",
            value: name.to_string(),
        });
    }
    Ok(())
}

impl Store {
    pub fn create_category(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        name: &str,
    ) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(Error::constraint("category name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Write)?;
        check_name_free(&tx, home_id, name, None)?;

        let category = Category {
            id: EntityId::new(EntityKind::Cat),
            home_id: home_id.clone(),
            name: name.to_string(),
        };
        tx.execute(
            "INSERT INTO categories (id, home_id, name, name_norm) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.id.to_string(),
                category.home_id.to_string(),
                category.name,
                normalize_name(&category.name)
            ],
        )?;
        tx.commit()?;
        Ok(category)
    }

    pub fn get_category(&self, caller: &IdentityId, id: &EntityId) -> Result<Category> {
        let category =
            fetch_category(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Cat, id))?;
        authorize::require_visible(&self.conn, caller, &category.home_id, EntityKind::Cat, id)?;
        Ok(category)
    }

    pub fn list_categories(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<Category>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, home_id, name FROM categories WHERE home_id = ?1 ORDER BY name_norm",
        )?;
        let rows = stmt.query_map(params![home_id.to_string()], category_from_row)?;

        let mut categories = Vec::new();
        for raw in rows {
            categories.push(raw?.into_category()?);
        }
        Ok(categories)
    }

    pub fn rename_category(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        name: &str,
    ) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(Error::constraint("category name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        let mut category = match fetch_category(&tx, id)? {
            Some(c) => c,
            None => return Err(Error::not_found(EntityKind::Cat, id)),
        };
        authorize::require_visible(&tx, caller, &category.home_id, EntityKind::Cat, id)?;
        check_name_free(&tx, &category.home_id, name, Some(id))?;

        category.name = name.to_string();
        tx.execute(
            "UPDATE categories SET name = ?1, name_norm = ?2 WHERE id = ?3",
            params![category.name, normalize_name(&category.name), id.to_string()],
        )?;
        tx.commit()?;
        Ok(category)
    }

    /// Delete a category; items pointing at it fall back to uncategorized
    pub fn delete_category(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let category = match fetch_category(&tx, id)? {
            Some(c) => c,
            None => return Err(Error::not_found(EntityKind::Cat, id)),
        };
        authorize::require_visible(&tx, caller, &category.home_id, EntityKind::Cat, id)?;

        tx.execute(
            "DELETE FROM categories WHERE id = ?1",
            params![id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}
