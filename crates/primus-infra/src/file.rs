//! JSON document character store.
//!
//! One document per owner under `{data_dir}/characters/`. The file name is
//! the SHA-256 of the owner id so arbitrary ids map to safe paths. A
//! `tokio::sync::Mutex` serializes read-modify-write cycles, and every write
//! goes to a temp file that is then renamed over the document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use primus_core::repository::character::{CharacterFilter, CharacterRepository, filter_and_sort};
use primus_types::auth::OwnerId;
use primus_types::character::{Character, CharacterId};
use primus_types::error::RepositoryError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

/// On-disk shape of one owner's document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct OwnerDocument {
    owner_id: Option<OwnerId>,
    #[serde(default)]
    characters: Vec<Character>,
}

/// File-backed implementation of `CharacterRepository`.
#[derive(Clone)]
pub struct JsonFileCharacterRepository {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileCharacterRepository {
    /// Store documents under `root` (created on first write).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Conventional location: `{data_dir}/characters`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("characters"))
    }

    fn document_path(&self, owner: &OwnerId) -> PathBuf {
        let digest = Sha256::digest(owner.as_str().as_bytes());
        self.root.join(format!("{:x}.json", digest))
    }

    async fn load(&self, owner: &OwnerId) -> Result<OwnerDocument, RepositoryError> {
        let path = self.document_path(owner);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                RepositoryError::Query(format!("corrupt document {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(OwnerDocument {
                owner_id: Some(owner.clone()),
                characters: Vec::new(),
            }),
            Err(e) => Err(RepositoryError::Query(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn save(&self, owner: &OwnerId, document: &OwnerDocument) -> Result<(), RepositoryError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to create store dir: {e}")))?;

        let path = self.document_path(owner);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to replace {}: {e}", path.display())))?;
        Ok(())
    }
}

impl CharacterRepository for JsonFileCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(&character.owner_id).await?;
        if document.characters.iter().any(|c| c.id == character.id) {
            return Err(RepositoryError::Conflict(format!(
                "character '{}' already exists",
                character.id
            )));
        }
        document.owner_id = Some(character.owner_id.clone());
        document.characters.push(character.clone());
        self.save(&character.owner_id, &document).await?;
        Ok(character.clone())
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> Result<Vec<Character>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let document = self.load(owner).await?;
        Ok(filter_and_sort(document.characters, filter))
    }

    async fn get_by_id(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> Result<Option<Character>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let document = self.load(owner).await?;
        Ok(document
            .characters
            .into_iter()
            .find(|c| &c.id == id && &c.owner_id == owner))
    }

    async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(&character.owner_id).await?;
        let slot = document
            .characters
            .iter_mut()
            .find(|c| c.id == character.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = character.clone();
        self.save(&character.owner_id, &document).await?;
        Ok(character.clone())
    }

    async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(owner).await?;
        let before = document.characters.len();
        document.characters.retain(|c| &c.id != id);
        if document.characters.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.save(owner, &document).await
    }
}
