//! Home entity type - the tenant and isolation root
//!
//! Everything else in the inventory hangs below exactly one home, and a
//! caller only ever sees rows belonging to homes they are a member of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, IdentityId};

/// A home: the tenant boundary that owns the entire entity graph beneath it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Role an identity holds within one home
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}. Use 'admin' or 'member'", s)),
        }
    }
}

/// Membership of one identity in one home; the (home, identity) pair is unique
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub home_id: EntityId,
    pub identity: IdentityId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}
