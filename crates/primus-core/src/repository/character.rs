//! Character repository trait definition.

use std::cmp::Ordering;
use std::str::FromStr;

use primus_types::auth::OwnerId;
use primus_types::character::{Character, CharacterId};
use primus_types::error::RepositoryError;

use super::SortOrder;

/// Field a character listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharacterSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Level,
}

impl CharacterSort {
    /// Column name in the relational store.
    pub fn column(self) -> &'static str {
        match self {
            CharacterSort::CreatedAt => "created_at",
            CharacterSort::UpdatedAt => "updated_at",
            CharacterSort::Name => "name",
            CharacterSort::Level => "level",
        }
    }
}

impl FromStr for CharacterSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "createdAt" => Ok(CharacterSort::CreatedAt),
            "updated_at" | "updatedAt" => Ok(CharacterSort::UpdatedAt),
            "name" => Ok(CharacterSort::Name),
            "level" => Ok(CharacterSort::Level),
            other => Err(format!("invalid sort field: '{other}'")),
        }
    }
}

/// Filter criteria for listing an owner's characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterFilter {
    /// Only characters of this role.
    pub role: Option<String>,
    /// Only characters at exactly this level.
    pub level: Option<u32>,
    /// Field to sort by. Defaults to `created_at`.
    pub sort_by: Option<CharacterSort>,
    /// Sort direction. Defaults to descending.
    pub sort_order: Option<SortOrder>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

impl CharacterFilter {
    /// Offset and limit as every backend must apply them: negative values
    /// count as zero and a missing limit means no limit.
    pub fn page(&self) -> (i64, Option<i64>) {
        (
            self.offset.unwrap_or(0).max(0),
            self.limit.map(|limit| limit.max(0)),
        )
    }
}

/// Repository trait for character persistence.
///
/// Every read and write is scoped to an owner: a character belonging to
/// someone else behaves exactly like a missing one.
///
/// Implementations live in primus-infra (SQLite, in-memory, JSON file).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CharacterRepository: Send + Sync {
    /// Persist a new character. Returns the stored record.
    fn create(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// List an owner's characters with optional filtering, sorting, and pagination.
    fn list_by_owner(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Character>, RepositoryError>> + Send;

    /// Fetch one character if it exists and belongs to `owner`.
    fn get_by_id(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// Replace a stored character. `NotFound` when the id/owner pair does not exist.
    fn update(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// Permanently delete a character. `NotFound` when the id/owner pair does not exist.
    fn delete(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Apply a filter to an in-process collection.
///
/// Shared by backends that cannot push filtering into a query engine.
pub fn filter_and_sort(characters: Vec<Character>, filter: &CharacterFilter) -> Vec<Character> {
    let mut characters: Vec<Character> = characters
        .into_iter()
        .filter(|c| filter.role.as_ref().is_none_or(|role| &c.role == role))
        .filter(|c| filter.level.is_none_or(|level| c.level == level))
        .collect();

    let sort_by = filter.sort_by.unwrap_or_default();
    let order = filter.sort_order.unwrap_or_default();
    characters.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by).then_with(|| a.id.0.cmp(&b.id.0));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let (offset, limit) = filter.page();
    let limit = limit.map_or(usize::MAX, |l| l as usize);
    characters
        .into_iter()
        .skip(offset as usize)
        .take(limit)
        .collect()
}

fn compare(a: &Character, b: &Character, sort_by: CharacterSort) -> Ordering {
    match sort_by {
        CharacterSort::CreatedAt => a.created_at.cmp(&b.created_at),
        CharacterSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        CharacterSort::Name => a.name.cmp(&b.name),
        CharacterSort::Level => a.level.cmp(&b.level),
    }
}
