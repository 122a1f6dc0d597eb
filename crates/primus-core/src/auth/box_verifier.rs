//! BoxAuthVerifier -- object-safe dynamic dispatch wrapper for AuthVerifier.

use std::future::Future;
use std::pin::Pin;

use primus_types::auth::Principal;
use primus_types::error::AuthError;

use super::AuthVerifier;

/// Object-safe version of [`AuthVerifier`] with boxed futures.
pub trait AuthVerifierDyn: Send + Sync {
    fn verify_boxed<'a>(
        &'a self,
        credential: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Principal, AuthError>> + Send + 'a>>;
}

impl<T: AuthVerifier> AuthVerifierDyn for T {
    fn verify_boxed<'a>(
        &'a self,
        credential: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Principal, AuthError>> + Send + 'a>> {
        Box::pin(self.verify(credential))
    }
}

/// Type-erased verifier, so the HTTP layer does not care which credential
/// store is configured.
pub struct BoxAuthVerifier {
    inner: Box<dyn AuthVerifierDyn + Send + Sync>,
}

impl BoxAuthVerifier {
    pub fn new<T: AuthVerifier + 'static>(verifier: T) -> Self {
        Self {
            inner: Box::new(verifier),
        }
    }
}

impl AuthVerifier for BoxAuthVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
        self.inner.verify_boxed(credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primus_types::auth::OwnerId;

    struct FixedKey;

    impl AuthVerifier for FixedKey {
        async fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
            match credential {
                "" => Err(AuthError::Missing),
                "open-sesame" => Ok(Principal {
                    owner_id: OwnerId::new("alice"),
                    key_name: "test".to_string(),
                }),
                _ => Err(AuthError::Invalid),
            }
        }
    }

    #[tokio::test]
    async fn test_boxed_verifier_delegates() {
        let verifier = BoxAuthVerifier::new(FixedKey);
        let principal = verifier.verify("open-sesame").await.unwrap();
        assert_eq!(principal.owner_id.as_str(), "alice");
        assert!(matches!(verifier.verify("nope").await, Err(AuthError::Invalid)));
        assert!(matches!(verifier.verify("").await, Err(AuthError::Missing)));
    }
}
