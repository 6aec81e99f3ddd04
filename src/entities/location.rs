//! Location entity type - the per-home place tree (house / room / zone)

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// Granularity of a location node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    House,
    Room,
    Zone,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::House => write!(f, "house"),
            LocationKind::Room => write!(f, "room"),
            LocationKind::Zone => write!(f, "zone"),
        }
    }
}

impl std::str::FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "house" => Ok(LocationKind::House),
            "room" => Ok(LocationKind::Room),
            "zone" => Ok(LocationKind::Zone),
            _ => Err(format!(
                "Invalid location kind: {}. Use house, room, or zone",
                s
            )),
        }
    }
}

/// A node in a home's location forest
///
/// The parent (when present) always belongs to the same home and the chain
/// above any node is acyclic; deleting a node removes its whole subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub home_id: EntityId,
    pub kind: LocationKind,
    pub parent_id: Option<EntityId>,
    pub name: String,
}
