//! API key authentication extractor.
//!
//! Extracts the credential from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! and resolves it to a [`Principal`] through the configured verifier chain.
//! Every character operation is scoped to the principal's owner id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use primus_core::auth::AuthVerifier;
use primus_types::auth::Principal;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Extracting this validates the API key.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;
        let principal = state.verifier.verify(&api_key).await?;
        tracing::debug!(owner = %principal.owner_id, key = %principal.key_name, "request authenticated");
        Ok(Authenticated(principal))
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        // The scheme name is case-insensitive.
        if let Some((scheme, key)) = auth_str.trim_start().split_once(' ') {
            if scheme.eq_ignore_ascii_case("bearer") {
                return Ok(key.trim().to_string());
            }
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(primus_types::error::AuthError::Missing.into())
}
