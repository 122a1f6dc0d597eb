//! API key verifiers.
//!
//! Keys are random 32-byte tokens rendered as `prm_<hex>`. Only the SHA-256
//! digest (lowercase hex) is ever stored or configured; the plaintext is
//! shown once at creation.

pub mod chain;
pub mod sqlite;
pub mod static_keys;

use aes_gcm::aead::{OsRng, rand_core::RngCore};
use sha2::{Digest, Sha256};

/// Prefix of every generated key.
pub const KEY_PREFIX: &str = "prm_";

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// Generate a new plaintext API key from the OS random source.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut key_bytes);
    format!(
        "{KEY_PREFIX}{}",
        key_bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
    )
}
