use serde::{Deserialize, Serialize};

use std::fmt;

/// Opaque identity of the caller that owns character records.
///
/// Every store operation is scoped to an owner; there is no cross-owner
/// visibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The result of a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Owner all subsequent store calls are scoped to.
    pub owner_id: OwnerId,
    /// Human label of the key that authenticated the request.
    pub key_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_is_transparent_in_json() {
        let owner = OwnerId::new("alice");
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"alice\"");
        assert_eq!(owner.to_string(), "alice");
    }
}
