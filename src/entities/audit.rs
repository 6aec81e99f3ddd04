//! Audit record entity type
//!
//! One record per successful mutation of an audited entity, written inside
//! the same transaction as the mutation itself. Records are append-only:
//! the store exposes no update or delete path for them, and they outlive
//! their home when the home is removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityKind, IdentityId};

/// The mutating operation an audit record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOp {
    Insert,
    Update,
    Delete,
}

impl AuditOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOp::Insert => "insert",
            AuditOp::Update => "update",
            AuditOp::Delete => "delete",
        }
    }

    /// Build the action label, e.g. `update_instance`
    pub fn action(&self, kind: EntityKind) -> String {
        let noun = match kind {
            EntityKind::Box => "box",
            EntityKind::Inst => "instance",
            other => return format!("{}_{}", self.as_str(), other.as_str().to_lowercase()),
        };
        format!("{}_{}", self.as_str(), noun)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: EntityId,
    /// Resolved owning home; null only when resolution failed at write time
    pub home_id: Option<EntityId>,
    /// Acting identity; null for system-originated writes
    pub actor: Option<IdentityId>,
    /// `<operation>_<entity>`, e.g. `insert_box`
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    /// Full prior row state; present for update/delete
    pub before: Option<serde_json::Value>,
    /// Full new row state; present for insert/update
    pub after: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(AuditOp::Insert.action(EntityKind::Box), "insert_box");
        assert_eq!(AuditOp::Update.action(EntityKind::Inst), "update_instance");
        assert_eq!(AuditOp::Delete.action(EntityKind::Inst), "delete_instance");
    }
}
