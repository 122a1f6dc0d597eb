//! Database-backed API keys.
//!
//! Keys live in the `api_keys` table as SHA-256 digests. Verification
//! records `last_used_at` on a best-effort basis.

use chrono::{DateTime, Utc};
use primus_core::auth::AuthVerifier;
use primus_types::auth::{OwnerId, Principal};
use primus_types::error::{AuthError, RepositoryError};
use serde::Serialize;
use sqlx::Row;

use super::{generate_api_key, hash_api_key};
use crate::sqlite::pool::DatabasePool;

/// Metadata of a stored key. The plaintext is never retained.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyInfo {
    pub id: String,
    pub owner_id: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// API key store and verifier over SQLite.
#[derive(Clone)]
pub struct SqliteApiKeyStore {
    pool: DatabasePool,
}

impl SqliteApiKeyStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Issue a key for `owner`. Returns the plaintext (shown once) and its metadata.
    pub async fn create_key(
        &self,
        owner: &OwnerId,
        name: &str,
    ) -> Result<(String, ApiKeyInfo), RepositoryError> {
        let plaintext = generate_api_key();
        let info = ApiKeyInfo {
            id: uuid::Uuid::now_v7().to_string(),
            owner_id: owner.clone(),
            name: name.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };

        let result = sqlx::query(
            "INSERT INTO api_keys (id, owner_id, key_hash, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&info.id)
        .bind(owner.as_str())
        .bind(hash_api_key(&plaintext))
        .bind(&info.name)
        .bind(info.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(owner = %owner, name = %name, "api key created");
                Ok((plaintext, info))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict("api key collision".to_string()))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    /// Keys issued to `owner`, oldest first.
    pub async fn list_keys(&self, owner: &OwnerId) -> Result<Vec<ApiKeyInfo>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, created_at, last_used_at FROM api_keys WHERE owner_id = ? ORDER BY created_at ASC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let created_at: String = row
                    .try_get("created_at")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let last_used_at: Option<String> = row
                    .try_get("last_used_at")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(ApiKeyInfo {
                    id: row
                        .try_get("id")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    owner_id: OwnerId::new(
                        row.try_get::<String, _>("owner_id")
                            .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    ),
                    name: row
                        .try_get("name")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    created_at: parse_datetime(&created_at)?,
                    last_used_at: last_used_at.as_deref().map(parse_datetime).transpose()?,
                })
            })
            .collect()
    }

    /// Revoke one of `owner`'s keys by id.
    pub async fn revoke_key(&self, owner: &OwnerId, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl AuthVerifier for SqliteApiKeyStore {
    async fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }

        let row = sqlx::query("SELECT id, owner_id, name FROM api_keys WHERE key_hash = ?")
            .bind(hash_api_key(credential))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| AuthError::StorageError(e.to_string()))?;

        let Some(row) = row else {
            return Err(AuthError::Invalid);
        };

        let id: String = row.get("id");
        let owner_id: String = row.get("owner_id");
        let name: String = row.get("name");

        // Update last_used_at (best effort, don't fail the request)
        let now = Utc::now().to_rfc3339();
        if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&id)
            .execute(&self.pool.writer)
            .await
        {
            tracing::debug!(key_id = %id, "failed to record key use: {e}");
        }

        Ok(Principal {
            owner_id: OwnerId::new(owner_id),
            key_name: name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primus_types::config::SqliteConfig;

    async fn test_store() -> SqliteApiKeyStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("keys.db");
        std::mem::forget(dir);
        let pool = DatabasePool::open(&db_path, &SqliteConfig::default())
            .await
            .unwrap();
        SqliteApiKeyStore::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let store = test_store().await;
        let alice = OwnerId::new("alice");
        let (key, info) = store.create_key(&alice, "cli").await.unwrap();
        assert_eq!(info.owner_id, alice);

        let principal = store.verify(&key).await.unwrap();
        assert_eq!(principal.owner_id, alice);
        assert_eq!(principal.key_name, "cli");

        let keys = store.list_keys(&alice).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_and_missing_keys() {
        let store = test_store().await;
        assert!(matches!(store.verify("prm_nope").await, Err(AuthError::Invalid)));
        assert!(matches!(store.verify("").await, Err(AuthError::Missing)));
    }

    #[tokio::test]
    async fn test_revoke_is_owner_scoped() {
        let store = test_store().await;
        let alice = OwnerId::new("alice");
        let (key, info) = store.create_key(&alice, "cli").await.unwrap();

        assert!(matches!(
            store.revoke_key(&OwnerId::new("mallory"), &info.id).await,
            Err(RepositoryError::NotFound)
        ));
        store.revoke_key(&alice, &info.id).await.unwrap();
        assert!(matches!(store.verify(&key).await, Err(AuthError::Invalid)));
    }
}
