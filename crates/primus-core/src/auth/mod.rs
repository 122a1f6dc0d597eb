//! Credential verification port.
//!
//! The transport layer extracts a raw credential (bearer token or API key)
//! and hands it to an [`AuthVerifier`], which resolves it to the owner every
//! character operation is scoped to.

pub mod box_verifier;

use primus_types::auth::Principal;
use primus_types::error::AuthError;

/// Resolves a raw credential to a [`Principal`].
///
/// Implementations live in primus-infra (database-backed API keys, static
/// keys from configuration).
pub trait AuthVerifier: Send + Sync {
    /// `AuthError::Missing` for an empty credential, `AuthError::Invalid` for
    /// one that is not recognised.
    fn verify(
        &self,
        credential: &str,
    ) -> impl std::future::Future<Output = Result<Principal, AuthError>> + Send;
}
