//! Entity identifier type.
//!
//! Every document in the primary store is keyed by a 24-character
//! lowercase-hex identifier (the ObjectId wire format), and the search index
//! reuses the same string as its document id. [`EntityId`] validates the
//! format once at the boundary so the rest of the code can pass ids around
//! without re-checking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated 24-character hex entity identifier.
///
/// # Examples
///
/// ```
/// use scifun_persistence::id::EntityId;
///
/// let id: EntityId = "65f2a00bc4e88a23d0f1a9b7".parse().unwrap();
/// assert_eq!(id.as_str(), "65f2a00bc4e88a23d0f1a9b7");
/// assert!("not-an-id".parse::<EntityId>().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(bson::oid::ObjectId::new().to_hex())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the string has the identifier format.
    pub fn is_valid(s: &str) -> bool {
        s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidIdentifier {
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.0
    }
}
