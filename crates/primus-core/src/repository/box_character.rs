//! BoxCharacterRepository -- object-safe dynamic dispatch wrapper for CharacterRepository.
//!
//! 1. Define an object-safe `CharacterRepositoryDyn` trait with boxed futures
//! 2. Blanket-impl `CharacterRepositoryDyn` for all `T: CharacterRepository`
//! 3. `BoxCharacterRepository` wraps `Box<dyn CharacterRepositoryDyn>` and delegates
//!
//! The storage backend is picked from configuration at startup, so the
//! service is instantiated over this boxed type.

use std::future::Future;
use std::pin::Pin;

use primus_types::auth::OwnerId;
use primus_types::character::{Character, CharacterId};
use primus_types::error::RepositoryError;

use super::character::{CharacterFilter, CharacterRepository};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`CharacterRepository`] with boxed futures.
pub trait CharacterRepositoryDyn: Send + Sync {
    fn create_boxed<'a>(&'a self, character: &'a Character) -> BoxFuture<'a, Character>;

    fn list_by_owner_boxed<'a>(
        &'a self,
        owner: &'a OwnerId,
        filter: &'a CharacterFilter,
    ) -> BoxFuture<'a, Vec<Character>>;

    fn get_by_id_boxed<'a>(
        &'a self,
        owner: &'a OwnerId,
        id: &'a CharacterId,
    ) -> BoxFuture<'a, Option<Character>>;

    fn update_boxed<'a>(&'a self, character: &'a Character) -> BoxFuture<'a, Character>;

    fn delete_boxed<'a>(&'a self, owner: &'a OwnerId, id: &'a CharacterId) -> BoxFuture<'a, ()>;
}

impl<T: CharacterRepository> CharacterRepositoryDyn for T {
    fn create_boxed<'a>(&'a self, character: &'a Character) -> BoxFuture<'a, Character> {
        Box::pin(self.create(character))
    }

    fn list_by_owner_boxed<'a>(
        &'a self,
        owner: &'a OwnerId,
        filter: &'a CharacterFilter,
    ) -> BoxFuture<'a, Vec<Character>> {
        Box::pin(self.list_by_owner(owner, filter))
    }

    fn get_by_id_boxed<'a>(
        &'a self,
        owner: &'a OwnerId,
        id: &'a CharacterId,
    ) -> BoxFuture<'a, Option<Character>> {
        Box::pin(self.get_by_id(owner, id))
    }

    fn update_boxed<'a>(&'a self, character: &'a Character) -> BoxFuture<'a, Character> {
        Box::pin(self.update(character))
    }

    fn delete_boxed<'a>(&'a self, owner: &'a OwnerId, id: &'a CharacterId) -> BoxFuture<'a, ()> {
        Box::pin(self.delete(owner, id))
    }
}

/// Type-erased character repository for runtime backend selection.
pub struct BoxCharacterRepository {
    inner: Box<dyn CharacterRepositoryDyn + Send + Sync>,
}

impl BoxCharacterRepository {
    /// Wrap a concrete repository in a type-erased box.
    pub fn new<T: CharacterRepository + 'static>(repo: T) -> Self {
        Self {
            inner: Box::new(repo),
        }
    }
}

impl CharacterRepository for BoxCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        self.inner.create_boxed(character).await
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> Result<Vec<Character>, RepositoryError> {
        self.inner.list_by_owner_boxed(owner, filter).await
    }

    async fn get_by_id(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> Result<Option<Character>, RepositoryError> {
        self.inner.get_by_id_boxed(owner, id).await
    }

    async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
        self.inner.update_boxed(character).await
    }

    async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<(), RepositoryError> {
        self.inner.delete_boxed(owner, id).await
    }
}
