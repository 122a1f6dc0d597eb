//! Process-local character store.
//!
//! Backed by a `DashMap` keyed by character id. Values are cloned out and no
//! shard guard is held across an `.await`. Nothing survives a restart.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use primus_core::repository::character::{CharacterFilter, CharacterRepository, filter_and_sort};
use primus_types::auth::OwnerId;
use primus_types::character::{Character, CharacterId};
use primus_types::error::RepositoryError;

/// In-memory implementation of `CharacterRepository`.
#[derive(Clone, Default)]
pub struct InMemoryCharacterRepository {
    characters: Arc<DashMap<CharacterId, Character>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored characters across all owners.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl CharacterRepository for InMemoryCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        match self.characters.entry(character.id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "character '{}' already exists",
                character.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(character.clone());
                Ok(character.clone())
            }
        }
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> Result<Vec<Character>, RepositoryError> {
        let owned: Vec<Character> = self
            .characters
            .iter()
            .filter(|entry| &entry.value().owner_id == owner)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(filter_and_sort(owned, filter))
    }

    async fn get_by_id(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> Result<Option<Character>, RepositoryError> {
        Ok(self
            .characters
            .get(id)
            .filter(|entry| &entry.value().owner_id == owner)
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
        let mut entry = self
            .characters
            .get_mut(&character.id)
            .filter(|entry| entry.value().owner_id == character.owner_id)
            .ok_or(RepositoryError::NotFound)?;
        *entry = character.clone();
        Ok(character.clone())
    }

    async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<(), RepositoryError> {
        self.characters
            .remove_if(id, |_, c| &c.owner_id == owner)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
