//! Tenancy store - homes and memberships
//!
//! Creating a home bootstraps its first membership: the creator becomes
//! admin inside the same transaction, so a home can never exist without an
//! owner. Joining is strictly self-service; changing or removing other
//! members is admin-only.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{audit, authorize, parse_datetime, resolver, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::audit::AuditOp;
use crate::entities::home::{Home, Membership, Role};

impl Store {
    /// Create a home; open to any authenticated identity
    pub fn create_home(&mut self, caller: &IdentityId, name: &str) -> Result<Home> {
        if name.trim().is_empty() {
            return Err(Error::constraint("home name must not be empty"));
        }

        let home = Home {
            id: EntityId::new(EntityKind::Home),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO homes (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                home.id.to_string(),
                home.name,
                home.created_at.to_rfc3339()
            ],
        )?;
        // Self-bootstrap: the creator is the first admin
        tx.execute(
            "INSERT INTO memberships (home_id, identity_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                home.id.to_string(),
                caller.as_str(),
                Role::Admin.to_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(home)
    }

    /// Read a home record (member-only)
    pub fn get_home(&self, caller: &IdentityId, id: &EntityId) -> Result<Home> {
        authorize::require(&self.conn, caller, id, Capability::Read)?;
        self.fetch_home(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Home, id))
    }

    /// List the homes the caller belongs to
    pub fn list_homes(&self, caller: &IdentityId) -> Result<Vec<Home>> {
        let mut stmt = self.conn.prepare(
            "SELECT h.id, h.name, h.created_at FROM homes h
             JOIN memberships m ON m.home_id = h.id
             WHERE m.identity_id = ?1
             ORDER BY h.created_at",
        )?;
        let rows = stmt.query_map(params![caller.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut homes = Vec::new();
        for row in rows {
            let (id, name, created_at) = row?;
            homes.push(Home {
                id: EntityId::parse(&id)?,
                name,
                created_at: parse_datetime(created_at),
            });
        }
        Ok(homes)
    }

    /// Rename a home (admin-only)
    pub fn update_home(&mut self, caller: &IdentityId, id: &EntityId, name: &str) -> Result<Home> {
        if name.trim().is_empty() {
            return Err(Error::constraint("home name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, id, Capability::Admin)?;
        let changed = tx.execute(
            "UPDATE homes SET name = ?1 WHERE id = ?2",
            params![name, id.to_string()],
        )?;
        if changed == 0 {
            return Err(Error::not_found(EntityKind::Home, id));
        }
        let home = tx
            .query_row(
                "SELECT id, name, created_at FROM homes WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .map(|(id, name, created_at)| {
                Ok::<_, Error>(Home {
                    id: EntityId::parse(&id)?,
                    name,
                    created_at: parse_datetime(created_at),
                })
            })??;
        tx.commit()?;
        Ok(home)
    }

    /// Delete a home and everything beneath it (admin-only)
    ///
    /// Audit rows are retained: the cascaded removal of each box and
    /// instance is itself audited, and those records carry the deleted
    /// home's id without a foreign key.
    pub fn delete_home(&mut self, caller: &IdentityId, id: &EntityId) -> Result<()> {
        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, id, Capability::Admin)?;

        let boxes = super::graph::fetch_boxes_in_home(&tx, id)?;
        let mut instances = Vec::new();
        for b in &boxes {
            instances.extend(super::graph::fetch_instances_in_box(&tx, &b.id)?);
        }

        let changed = tx.execute("DELETE FROM homes WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(Error::not_found(EntityKind::Home, id));
        }

        for inst in &instances {
            audit::record(
                &tx,
                AuditOp::Delete,
                EntityKind::Inst,
                &inst.id,
                Some(id),
                Some(caller),
                Some(audit::snapshot(inst)?),
                None,
            )?;
        }
        for b in &boxes {
            audit::record(
                &tx,
                AuditOp::Delete,
                EntityKind::Box,
                &b.id,
                Some(id),
                Some(caller),
                Some(audit::snapshot(b)?),
                None,
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Self-service join: an identity may only insert a membership row for
    /// itself, never on behalf of another identity
    pub fn join_home(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        identity: &IdentityId,
        role: Role,
    ) -> Result<Membership> {
        if identity != caller {
            return Err(Error::Unauthorized);
        }

        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM homes WHERE id = ?1)",
            params![home_id.to_string()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::not_found(EntityKind::Home, home_id));
        }
        let duplicate: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM memberships WHERE home_id = ?1 AND identity_id = ?2)",
            params![home_id.to_string(), identity.as_str()],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(Error::DuplicateKey {
                field: "membership",
                value: format!("{}@{}", identity, home_id),
            });
        }

        let membership = Membership {
            home_id: home_id.clone(),
            identity: identity.clone(),
            role,
            joined_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO memberships (home_id, identity_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                membership.home_id.to_string(),
                membership.identity.as_str(),
                membership.role.to_string(),
                membership.joined_at.to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(membership)
    }

    /// List a home's members (member-read)
    pub fn list_members(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<Membership>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let mut stmt = self.conn.prepare(
            "SELECT home_id, identity_id, role, joined_at FROM memberships
             WHERE home_id = ?1 ORDER BY joined_at",
        )?;
        let rows = stmt.query_map(params![home_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut members = Vec::new();
        for row in rows {
            let (home_id, identity, role, joined_at) = row?;
            members.push(Membership {
                home_id: EntityId::parse(&home_id)?,
                identity: IdentityId::new(identity),
                role: role.parse().map_err(Error::ConstraintViolation)?,
                joined_at: parse_datetime(joined_at),
            });
        }
        Ok(members)
    }

    /// Change a member's role (admin-only)
    pub fn set_member_role(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        identity: &IdentityId,
        role: Role,
    ) -> Result<Membership> {
        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Admin)?;

        let changed = tx.execute(
            "UPDATE memberships SET role = ?1 WHERE home_id = ?2 AND identity_id = ?3",
            params![role.to_string(), home_id.to_string(), identity.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found(EntityKind::Home, home_id));
        }
        let joined_at: String = tx.query_row(
            "SELECT joined_at FROM memberships WHERE home_id = ?1 AND identity_id = ?2",
            params![home_id.to_string(), identity.as_str()],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(Membership {
            home_id: home_id.clone(),
            identity: identity.clone(),
            role,
            joined_at: parse_datetime(joined_at),
        })
    }

    /// Remove a membership (admin-only)
    pub fn remove_member(
        &mut self,
        caller: &IdentityId,
        home_id: &EntityId,
        identity: &IdentityId,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        authorize::require(&tx, caller, home_id, Capability::Admin)?;

        let changed = tx.execute(
            "DELETE FROM memberships WHERE home_id = ?1 AND identity_id = ?2",
            params![home_id.to_string(), identity.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found(EntityKind::Home, home_id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Public form of the authorization contract: Allow (`true`) or Deny
    pub fn authorized(
        &self,
        identity: &IdentityId,
        home_id: &EntityId,
        capability: Capability,
    ) -> Result<bool> {
        authorize::check(&self.conn, identity, home_id, capability)
    }

    /// Public form of the tenant-resolution contract
    pub fn resolve_tenant(&self, kind: EntityKind, id: &EntityId) -> Result<EntityId> {
        resolver::resolve_home(&self.conn, kind, id)
    }

    fn fetch_home(&self, id: &EntityId) -> Result<Option<Home>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM homes WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        match row {
            None => Ok(None),
            Some((id, name, created_at)) => Ok(Some(Home {
                id: EntityId::parse(&id)?,
                name,
                created_at: parse_datetime(created_at),
            })),
        }
    }
}
