//! Storage box entity type
//!
//! A box is the physical container item instances live in. Its scan token
//! is printed on a label and scanned without any tenant context, so the
//! token is unique across all homes, not just within one.

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageBox {
    pub id: EntityId,
    pub home_id: EntityId,
    /// Where the box currently sits; cleared when that location is deleted
    pub location_id: Option<EntityId>,
    pub label: String,
    /// Globally unique opaque token, e.g. "box:1" or a generated code
    pub scan_token: String,
    pub notes: Option<String>,
}

/// Generate an opaque scan token for boxes created without one
pub fn generate_scan_token() -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;

    let code: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("box:{}", code.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_have_prefix_and_length() {
        let token = generate_scan_token();
        assert!(token.starts_with("box:"));
        assert_eq!(token.len(), 14);
    }
}
