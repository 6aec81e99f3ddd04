//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity kind prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    /// Home (tenant, the isolation root)
    Home,
    /// Location (house / room / zone tree)
    Loc,
    /// Category
    Cat,
    /// Storage box
    Box,
    /// Item concept
    Item,
    /// Item instance (physical placement inside a box)
    Inst,
    /// Photo reference
    Phot,
    /// Audit record
    Aud,
}

impl EntityKind {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Home => "HOME",
            EntityKind::Loc => "LOC",
            EntityKind::Cat => "CAT",
            EntityKind::Box => "BOX",
            EntityKind::Item => "ITEM",
            EntityKind::Inst => "INST",
            EntityKind::Phot => "PHOT",
            EntityKind::Aud => "AUD",
        }
    }

    /// Get all valid kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Home,
            EntityKind::Loc,
            EntityKind::Cat,
            EntityKind::Box,
            EntityKind::Item,
            EntityKind::Inst,
            EntityKind::Phot,
            EntityKind::Aud,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HOME" => Ok(EntityKind::Home),
            "LOC" => Ok(EntityKind::Loc),
            "CAT" => Ok(EntityKind::Cat),
            "BOX" => Ok(EntityKind::Box),
            "ITEM" => Ok(EntityKind::Item),
            "INST" => Ok(EntityKind::Inst),
            "PHOT" => Ok(EntityKind::Phot),
            "AUD" => Ok(EntityKind::Aud),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a kind prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    kind: EntityKind,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given kind
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a kind and existing ULID
    pub fn from_parts(kind: EntityKind, ulid: Ulid) -> Self {
        Self { kind, ulid }
    }

    /// Get the entity kind
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// Parse an EntityId, additionally requiring a specific kind
    pub fn parse_as(s: &str, kind: EntityKind) -> Result<Self, IdParseError> {
        let id = Self::parse(s)?;
        if id.kind != kind {
            return Err(IdParseError::WrongKind {
                expected: kind,
                found: id.kind,
            });
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let kind = kind_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { kind, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque caller identity, pre-established by an upstream authentication
/// provider. The core never inspects it beyond equality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: HOME, LOC, CAT, BOX, ITEM, INST, PHOT, AUD)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),

    #[error("expected a {expected} ID, found {found}")]
    WrongKind {
        expected: EntityKind,
        found: EntityKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityKind::Box);
        assert!(id.to_string().starts_with("BOX-"));
        assert_eq!(id.to_string().len(), 30); // BOX- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityKind::Home);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.kind(), EntityKind::Home);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("BOX01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("BOX-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_parse_as_rejects_wrong_kind() {
        let id = EntityId::new(EntityKind::Item);
        let err = EntityId::parse_as(&id.to_string(), EntityKind::Box).unwrap_err();
        assert!(matches!(err, IdParseError::WrongKind { .. }));
    }

    #[test]
    fn test_all_kinds_parse() {
        for kind in EntityKind::all() {
            let id = EntityId::new(*kind);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.kind(), *kind);
        }
    }
}
