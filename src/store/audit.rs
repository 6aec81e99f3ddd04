//! Audit interceptor and audit queries
//!
//! [`record`] is called by every mutating box/instance operation, inside
//! the operation's own transaction, so the record and the mutation commit
//! or roll back together. The interceptor only observes: it never rejects
//! the mutation, and a failed tenant resolution degrades to a null-home
//! record instead of failing the caller's request.
//!
//! Reads are member-scoped; there is no public write, update, or delete
//! path for audit rows.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{authorize, parse_datetime, Capability, Store};
use crate::core::error::{Error, Result};
use crate::core::identity::{EntityId, EntityKind, IdentityId};
use crate::entities::audit::{AuditOp, AuditRecord};

/// Write one audit record inside the caller's transaction
pub(crate) fn record(
    conn: &Connection,
    op: AuditOp,
    kind: EntityKind,
    entity_id: &EntityId,
    home_id: Option<&EntityId>,
    actor: Option<&IdentityId>,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
) -> Result<()> {
    let id = EntityId::new(EntityKind::Aud);
    conn.execute(
        "INSERT INTO audit_log (id, home_id, actor, action, entity_kind, entity_id, before_image, after_image, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            home_id.map(|h| h.to_string()),
            actor.map(|a| a.as_str().to_string()),
            op.action(kind),
            kind.as_str(),
            entity_id.to_string(),
            before.map(|v| v.to_string()),
            after.map(|v| v.to_string()),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Serialize a row snapshot for a before/after image
pub(crate) fn snapshot<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn audit_from_row(row: &Row) -> rusqlite::Result<RawAudit> {
    Ok(RawAudit {
        id: row.get(0)?,
        home_id: row.get(1)?,
        actor: row.get(2)?,
        action: row.get(3)?,
        entity_kind: row.get(4)?,
        entity_id: row.get(5)?,
        before: row.get(6)?,
        after: row.get(7)?,
        recorded_at: row.get(8)?,
    })
}

struct RawAudit {
    id: String,
    home_id: Option<String>,
    actor: Option<String>,
    action: String,
    entity_kind: String,
    entity_id: String,
    before: Option<String>,
    after: Option<String>,
    recorded_at: String,
}

impl RawAudit {
    fn into_record(self) -> Result<AuditRecord> {
        let home_id = match self.home_id {
            Some(h) => Some(EntityId::parse(&h)?),
            None => None,
        };
        Ok(AuditRecord {
            id: EntityId::parse(&self.id)?,
            home_id,
            actor: self.actor.map(IdentityId::new),
            action: self.action,
            entity_kind: self.entity_kind.parse()?,
            entity_id: EntityId::parse(&self.entity_id)?,
            before: parse_image(self.before)?,
            after: parse_image(self.after)?,
            recorded_at: parse_datetime(self.recorded_at),
        })
    }
}

fn parse_image(text: Option<String>) -> Result<Option<serde_json::Value>> {
    match text {
        None => Ok(None),
        Some(t) => Ok(Some(serde_json::from_str(&t)?)),
    }
}

const AUDIT_COLS: &str =
    "id, home_id, actor, action, entity_kind, entity_id, before_image, after_image, recorded_at";

impl Store {
    /// List a home's audit trail, oldest first (member-read)
    pub fn list_audit(&self, caller: &IdentityId, home_id: &EntityId) -> Result<Vec<AuditRecord>> {
        authorize::require(&self.conn, caller, home_id, Capability::Read)?;

        let sql = format!(
            "SELECT {} FROM audit_log WHERE home_id = ?1 ORDER BY recorded_at, id",
            AUDIT_COLS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![home_id.to_string()], audit_from_row)?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(raw?.into_record()?);
        }
        Ok(records)
    }

    /// Get a single audit record (member-read via its home)
    pub fn get_audit(&self, caller: &IdentityId, id: &EntityId) -> Result<AuditRecord> {
        let sql = format!("SELECT {} FROM audit_log WHERE id = ?1", AUDIT_COLS);
        let raw = self
            .conn
            .query_row(&sql, params![id.to_string()], audit_from_row)
            .optional()?
            .ok_or_else(|| Error::not_found(EntityKind::Aud, id))?;
        let record = raw.into_record()?;

        match &record.home_id {
            Some(home) => authorize::require_visible(&self.conn, caller, home, EntityKind::Aud, id)?,
            // Un-attributable records are not exposed through the API
            None => return Err(Error::not_found(EntityKind::Aud, id)),
        }
        Ok(record)
    }
}
