//! SQLite character repository implementation.
//!
//! Implements `CharacterRepository` from `primus-core` using sqlx with split
//! read/write pools. Every statement carries an `owner_id` predicate.

use chrono::{DateTime, Utc};
use primus_core::repository::SortOrder;
use primus_core::repository::character::{CharacterFilter, CharacterRepository};
use primus_types::auth::OwnerId;
use primus_types::character::{AbilityScores, Character, CharacterId};
use primus_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CharacterRepository`.
pub struct SqliteCharacterRepository {
    pool: DatabasePool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a domain `Character`.
struct CharacterRow {
    id: String,
    owner_id: String,
    name: String,
    level: i64,
    role: String,
    archetype: String,
    scores: [i64; 6],
    skills: String,
    created_at: String,
    updated_at: String,
}

impl CharacterRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            level: row.try_get("level")?,
            role: row.try_get("role")?,
            archetype: row.try_get("archetype")?,
            scores: [
                row.try_get("strength")?,
                row.try_get("dexterity")?,
                row.try_get("constitution")?,
                row.try_get("intelligence")?,
                row.try_get("wisdom")?,
                row.try_get("charisma")?,
            ],
            skills: row.try_get("skills")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_character(self) -> Result<Character, RepositoryError> {
        let id = self
            .id
            .parse::<CharacterId>()
            .map_err(|e| RepositoryError::Query(format!("invalid character id: {e}")))?;

        let level = u32::try_from(self.level)
            .map_err(|_| RepositoryError::Query(format!("invalid level: {}", self.level)))?;

        let mut scores = [0u8; 6];
        for (slot, raw) in scores.iter_mut().zip(self.scores) {
            *slot = u8::try_from(raw)
                .map_err(|_| RepositoryError::Query(format!("invalid ability score: {raw}")))?;
        }

        let skills: Vec<String> = serde_json::from_str(&self.skills)
            .map_err(|e| RepositoryError::Query(format!("invalid skills JSON: {e}")))?;

        Ok(Character {
            id,
            owner_id: OwnerId::new(self.owner_id),
            name: self.name,
            level,
            role: self.role,
            archetype: self.archetype,
            stats: AbilityScores::from_array(scores),
            skills,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn skills_json(character: &Character) -> Result<String, RepositoryError> {
    serde_json::to_string(&character.skills).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl CharacterRepository for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        let skills = skills_json(character)?;
        let stats = &character.stats;

        let result = sqlx::query(
            "INSERT INTO characters (id, owner_id, name, level, role, archetype, strength, dexterity, constitution, intelligence, wisdom, charisma, skills, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(character.owner_id.as_str())
        .bind(&character.name)
        .bind(i64::from(character.level))
        .bind(&character.role)
        .bind(&character.archetype)
        .bind(i64::from(stats.strength))
        .bind(i64::from(stats.dexterity))
        .bind(i64::from(stats.constitution))
        .bind(i64::from(stats.intelligence))
        .bind(i64::from(stats.wisdom))
        .bind(i64::from(stats.charisma))
        .bind(&skills)
        .bind(format_datetime(&character.created_at))
        .bind(format_datetime(&character.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(character.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("character '{}' already exists", character.id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> Result<Vec<Character>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM characters WHERE owner_id = ?");
        if filter.role.is_some() {
            sql.push_str(" AND role = ?");
        }
        if filter.level.is_some() {
            sql.push_str(" AND level = ?");
        }

        // Column names come from a closed enum, never from input.
        let column = filter.sort_by.unwrap_or_default().column();
        let order = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {column} {order}, id {order}"));

        // SQLite reads a negative LIMIT as "no limit", so bind the normalised page.
        let (offset, limit) = filter.page();
        let paginate = limit.is_some() || offset > 0;
        if paginate {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query(&sql).bind(owner.as_str());
        if let Some(role) = &filter.role {
            query = query.bind(role);
        }
        if let Some(level) = filter.level {
            query = query.bind(i64::from(level));
        }
        if paginate {
            query = query.bind(limit.unwrap_or(-1)).bind(offset);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut characters = Vec::with_capacity(rows.len());
        for row in &rows {
            let character_row =
                CharacterRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            characters.push(character_row.into_character()?);
        }

        Ok(characters)
    }

    async fn get_by_id(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
    ) -> Result<Option<Character>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let character_row =
                    CharacterRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(character_row.into_character()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
        let skills = skills_json(character)?;
        let stats = &character.stats;

        let result = sqlx::query(
            "UPDATE characters SET name = ?, level = ?, role = ?, archetype = ?, strength = ?, dexterity = ?, constitution = ?, intelligence = ?, wisdom = ?, charisma = ?, skills = ?, updated_at = ?
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&character.name)
        .bind(i64::from(character.level))
        .bind(&character.role)
        .bind(&character.archetype)
        .bind(i64::from(stats.strength))
        .bind(i64::from(stats.dexterity))
        .bind(i64::from(stats.constitution))
        .bind(i64::from(stats.intelligence))
        .bind(i64::from(stats.wisdom))
        .bind(i64::from(stats.charisma))
        .bind(&skills)
        .bind(format_datetime(&character.updated_at))
        .bind(character.id.to_string())
        .bind(character.owner_id.as_str())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(character.clone())
    }

    async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
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
