//! Verifier over keys declared in `config.toml`.

use std::collections::HashMap;

use primus_core::auth::AuthVerifier;
use primus_types::auth::{OwnerId, Principal};
use primus_types::config::StaticKey;
use primus_types::error::AuthError;

use super::hash_api_key;

/// Resolves credentials against `[[auth.static_keys]]` digests.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyVerifier {
    by_hash: HashMap<String, Principal>,
}

impl StaticKeyVerifier {
    pub fn new(keys: &[StaticKey]) -> Self {
        let by_hash = keys
            .iter()
            .map(|key| {
                (
                    key.key_sha256.to_lowercase(),
                    Principal {
                        owner_id: OwnerId::new(key.owner_id.clone()),
                        key_name: key.name.clone(),
                    },
                )
            })
            .collect();
        Self { by_hash }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

impl AuthVerifier for StaticKeyVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }
        self.by_hash
            .get(&hash_api_key(credential))
            .cloned()
            .ok_or(AuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verifies_configured_digest() {
        let verifier = StaticKeyVerifier::new(&[StaticKey {
            owner_id: "alice".to_string(),
            key_sha256: hash_api_key("alice-secret").to_uppercase(),
            name: "laptop".to_string(),
        }]);
        assert_eq!(verifier.len(), 1);

        let principal = verifier.verify("alice-secret").await.unwrap();
        assert_eq!(principal.owner_id, OwnerId::new("alice"));
        assert_eq!(principal.key_name, "laptop");

        assert!(matches!(verifier.verify("guess").await, Err(AuthError::Invalid)));
        assert!(matches!(verifier.verify("").await, Err(AuthError::Missing)));
    }
}
