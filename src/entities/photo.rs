//! Photo entity type - a storage locator attached to an item, box, or invoice
//!
//! The owner reference is polymorphic (kind + id, no foreign key); the core
//! stores and validates the locator string but never touches the bytes.

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// What a photo is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOwner {
    Item,
    Box,
    Invoice,
}

impl std::fmt::Display for PhotoOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoOwner::Item => write!(f, "item"),
            PhotoOwner::Box => write!(f, "box"),
            PhotoOwner::Invoice => write!(f, "invoice"),
        }
    }
}

impl std::str::FromStr for PhotoOwner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "item" => Ok(PhotoOwner::Item),
            "box" => Ok(PhotoOwner::Box),
            "invoice" => Ok(PhotoOwner::Invoice),
            _ => Err(format!(
                "Invalid photo owner: {}. Use item, box, or invoice",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: EntityId,
    pub home_id: EntityId,
    pub owner_type: PhotoOwner,
    /// Polymorphic owner reference, stored verbatim
    pub owner_id: String,
    /// Opaque locator in the external blob store
    pub locator: String,
}
