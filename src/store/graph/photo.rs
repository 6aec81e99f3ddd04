//! Photo reference operations
//!
//! The core stores and validates the locator and the polymorphic owner
//! reference; the bytes live in an external blob store. When the owner is
//! an item or box the reference is checked against the same home; invoice
//! owners have no table and are stored verbatim.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::{authorize, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::photo::{Photo, PhotoOwner};

struct RawPhoto {
    id: String,
    home_id: String,
    owner_type: String,
    owner_id: String,
    locator: String,
}

impl RawPhoto {
    fn into_photo(self) -> Result<Photo> {
        Ok(Photo {
            id: EntityId::parse(&self.id)?,
            home_id: EntityId::parse(&self.home_id)?,
            owner_type: self.owner_type.parse().map_err(Error::ConstraintViolation)?,
            owner_id: self.owner_id,
            locator: self.locator,
        })
    }
}

fn photo_from_row(row: &Row) -> rusqlite::Result<RawPhoto> {
    Ok(RawPhoto {
        id: row.get(0)?,
        home_id: row.get(1)?,
        owner_type: row.get(2)?,
        owner_id: row.get(3)?,
        locator: row.get(4)?,
    })
}

fn fetch_photo(conn: &Connection, id: &EntityId) -> Result<Option<Photo>> {
    let raw = conn
        .query_row(
            "SELECT id, home_id, owner_type, owner_id, locator FROM photos WHERE id = ?1",
            params![id.to_string()],
            photo_from_row,
        )
        .optional()?;
    raw.map(RawPhoto::into_photo).transpose()
}

fn check_owner(
    conn: &Connection,
    home_id: &EntityId,
    owner_type: PhotoOwner,
    owner_id: &str,
) -> Result<()> {
    let table = match owner_type {
        PhotoOwner::Item => "items",
        PhotoOwner::Box => "boxes",
        // Invoices live outside the core schema
        PhotoOwner::Invoice => return Ok(()),
    };
    let sql = format!("SELECT home_id FROM {} WHERE id = ?1", table);
    let home: Option<String> = conn
        .query_row(&sql, params![owner_id], |row| row.get(0))
        .optional()?;
    match home {
        Some(h) if h == home_id.to_string() => Ok(()),
        _ => Err(Error::constraint(format!(
            "photo owner {} does not exist in this home",
            owner_type
        ))),
    }
}

impl Store {
    pub fn create_photo(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        owner_type: PhotoOwner,
        owner_id: &str,
        locator: &str,
    ) -> Result<Photo> {
        if locator.trim().is_empty() {
            return Err(Error::constraint("photo locator must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Write)?;
        check_owner(&tx, home_id, owner_type, owner_id)?;

        let photo = Photo {
            id: EntityId::new(EntityKind::Phot),
            home_id: home_id.clone(),
            owner_type,
            owner_id: owner_id.to_string(),
            locator: locator.to_string(),
        };
        tx.execute(
            "INSERT INTO photos (id, home_id, owner_type, owner_id, locator) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                photo.id.to_string(),
                photo.home_id.to_string(),
                photo.owner_type.to_string(),
                photo.owner_id,
                photo.locator
            ],
        )?;
        tx.commit()?;
        Ok(photo)
    }

    pub fn get_photo(&self, caller: &IdentityId, id: &EntityId) -> Result<Photo> {
        let photo =
            fetch_photo(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Phot, id))?;
        authorize::require_visible(&self.conn, caller, &photo.home_id, EntityKind::Phot, id)?;
        Ok(photo)
    }

    /// List photos in a home, optionally narrowed to one owner
    pub fn list_photos(
        &self,
        caller: &IdentityId,
        home_id: &EntityId,
        owner: Option<(PhotoOwner, &str)>,
    ) -> Result<Vec<Photo>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, home_id, owner_type, owner_id, locator FROM photos
             WHERE home_id = ?1
               AND (?2 IS NULL OR owner_type = ?2)
               AND (?3 IS NULL OR owner_id = ?3)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            params![
                home_id.to_string(),
                owner.map(|(t, _)| t.to_string()),
                owner.map(|(_, id)| id.to_string())
            ],
            photo_from_row,
        )?;

        let mut photos = Vec::new();
        for raw in rows {
            photos.push(raw?.into_photo()?);
        }
        Ok(photos)
    }

    pub fn update_photo_locator(
        &mut self,
        caller: &IdentityId,
        id: &EntityId,
        locator: &str,
    ) -> Result<Photo> {
        if locator.trim().is_empty() {
            return Err(Error::constraint("photo locator must not be empty"));
        }

        let tx = self.conn.transaction()?;
        let mut photo = match fetch_photo(&tx, id)? {
            Some(p) => p,
            None => return Err(Error::not_found(EntityKind::Phot, id)),
        };
        authorize::require_visible(&tx, caller, &photo.home_id, EntityKind::Phot, id)?;

        photo.locator = locator.to_string();
        tx.execute(
            "UPDATE photos SET locator = ?1 WHERE id = ?2",
            params![photo.locator, id.to_string()],
        )?;
        tx.commit()?;
        Ok(photo)
    }

    pub fn delete_photo(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let photo = match fetch_photo(&tx, id)? {
            Some(p) => p,
            None => return Err(Error::not_found(EntityKind::Phot, id)),
        };
        authorize::require_visible(&tx, caller, &photo.home_id, EntityKind::Phot, id)?;

        tx.execute("DELETE FROM photos WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}
