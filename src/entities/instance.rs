//! Item instance entity type - a physical placement of an item in a box
//!
//! Instances store no home column at all. The owning home is always derived
//! through the box, which is what keeps the tenant derivable instead of
//! duplicated and potentially stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// Lifecycle status of a physical instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceStatus {
    Ok,
    ToRepair,
    ToGive,
    ToLend,
    ToSell,
    GivenAway,
}

impl Default for InstanceStatus {
    fn default() -> Self {
        InstanceStatus::Ok
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceStatus::Ok => write!(f, "ok"),
            InstanceStatus::ToRepair => write!(f, "to-repair"),
            InstanceStatus::ToGive => write!(f, "to-give"),
            InstanceStatus::ToLend => write!(f, "to-lend"),
            InstanceStatus::ToSell => write!(f, "to-sell"),
            InstanceStatus::GivenAway => write!(f, "given-away"),
        }
    }
}

impl std::str::FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" => Ok(InstanceStatus::Ok),
            "to-repair" => Ok(InstanceStatus::ToRepair),
            "to-give" => Ok(InstanceStatus::ToGive),
            "to-lend" => Ok(InstanceStatus::ToLend),
            "to-sell" => Ok(InstanceStatus::ToSell),
            "given-away" => Ok(InstanceStatus::GivenAway),
            _ => Err(format!(
                "Invalid status: {}. Use ok, to-repair, to-give, to-lend, to-sell, or given-away",
                s
            )),
        }
    }
}

/// A physical instance of an item inside exactly one box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInstance {
    pub id: EntityId,
    pub item_id: EntityId,
    pub box_id: EntityId,
    pub quantity: i64,
    pub status: InstanceStatus,
    pub sale_price: Option<f64>,
    pub notes: Option<String>,
    /// Stamped by the store on every update; caller-supplied values are
    /// never accepted
    pub updated_at: DateTime<Utc>,
}
