//! Category entity type
//!
//! Names are unique per home under Unicode case folding ("Câbles" and
//! "câbles" collide).

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub home_id: EntityId,
    pub name: String,
}
