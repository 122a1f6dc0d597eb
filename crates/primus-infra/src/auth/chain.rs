//! Verifier chain -- tries each configured credential store in order.

use primus_core::auth::AuthVerifier;
use primus_core::auth::box_verifier::BoxAuthVerifier;
use primus_types::auth::Principal;
use primus_types::error::AuthError;

/// First verifier to accept the credential wins.
///
/// `Invalid` from one verifier falls through to the next; a store error
/// aborts the chain.
pub struct ChainedVerifier {
    verifiers: Vec<BoxAuthVerifier>,
}

impl ChainedVerifier {
    pub fn new(verifiers: Vec<BoxAuthVerifier>) -> Self {
        Self { verifiers }
    }
}

impl AuthVerifier for ChainedVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }
        for verifier in &self.verifiers {
            match verifier.verify(credential).await {
                Ok(principal) => return Ok(principal),
                Err(AuthError::Invalid) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(AuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_api_key;
    use crate::auth::static_keys::StaticKeyVerifier;
    use primus_types::config::StaticKey;

    fn static_verifier(owner: &str, key: &str) -> BoxAuthVerifier {
        BoxAuthVerifier::new(StaticKeyVerifier::new(&[StaticKey {
            owner_id: owner.to_string(),
            key_sha256: hash_api_key(key),
            name: "static".to_string(),
        }]))
    }

    #[tokio::test]
    async fn test_falls_through_to_later_verifier() {
        let chain = ChainedVerifier::new(vec![
            static_verifier("alice", "key-a"),
            static_verifier("bob", "key-b"),
        ]);
        assert_eq!(chain.verify("key-b").await.unwrap().owner_id.as_str(), "bob");
        assert_eq!(chain.verify("key-a").await.unwrap().owner_id.as_str(), "alice");
        assert!(matches!(chain.verify("key-c").await, Err(AuthError::Invalid)));
    }

    #[tokio::test]
    async fn test_empty_chain_rejects() {
        let chain = ChainedVerifier::new(Vec::new());
        assert!(matches!(chain.verify("anything").await, Err(AuthError::Invalid)));
        assert!(matches!(chain.verify("").await, Err(AuthError::Missing)));
    }
}
