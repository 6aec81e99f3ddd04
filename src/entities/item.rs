//! Item entity type - the concept of a thing, independent of where copies sit
//!
//! Names are unique per home under Unicode case folding, like categories.

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub home_id: EntityId,
    pub name: String,
    pub category_id: Option<EntityId>,
}
