//! Character management service.
//!
//! Every write goes through the progression rules first. Under `reject`
//! enforcement a draft with violations is never persisted; under `warn` it is
//! saved and the violations are logged.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use primus_types::auth::OwnerId;
use primus_types::character::{
    AbilityScores, Character, CharacterDraft, CharacterId, CharacterStats, CreateCharacterRequest,
    UpdateCharacterRequest,
};
use primus_types::error::{CharacterError, RepositoryError};
use primus_types::rules::{Enforcement, ValidationReport};

use crate::repository::character::{CharacterFilter, CharacterRepository};
use crate::rules::ProgressionRules;
use crate::sheet::CharacterSheet;

/// Service orchestrating the character lifecycle for one owner at a time.
///
/// Generic over the repository so primus-core never depends on primus-infra.
pub struct CharacterService<R: CharacterRepository> {
    repo: R,
    rules: Arc<ProgressionRules>,
    enforcement: Enforcement,
}

impl<R: CharacterRepository> CharacterService<R> {
    pub fn new(repo: R, rules: Arc<ProgressionRules>, enforcement: Enforcement) -> Self {
        Self {
            repo,
            rules,
            enforcement,
        }
    }

    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    pub fn enforcement(&self) -> Enforcement {
        self.enforcement
    }

    /// Create a character. Missing level, stats and skills take their defaults.
    pub async fn create(
        &self,
        owner: &OwnerId,
        request: CreateCharacterRequest,
    ) -> Result<Character, CharacterError> {
        let (min_level, _) = self.rules.level_range();
        let floor = self.rules.point_buy().floor;

        let draft = CharacterDraft {
            name: request.name.trim().to_string(),
            level: request.level.unwrap_or(min_level),
            role: request.role,
            archetype: request.archetype,
            stats: request.stats.unwrap_or_else(|| AbilityScores::uniform(floor)),
            skills: request.skills.unwrap_or_default(),
        };
        self.enforce(&draft)?;

        let now = Utc::now();
        let character = Character {
            id: CharacterId::new(),
            owner_id: owner.clone(),
            name: draft.name,
            level: draft.level,
            role: draft.role,
            archetype: draft.archetype,
            stats: draft.stats,
            skills: draft.skills,
            created_at: now,
            updated_at: now,
        };

        let character = self.repo.create(&character).await.map_err(storage_error)?;
        tracing::debug!(owner = %owner, id = %character.id, name = %character.name, "character created");
        Ok(character)
    }

    pub async fn list(
        &self,
        owner: &OwnerId,
        filter: &CharacterFilter,
    ) -> Result<Vec<Character>, CharacterError> {
        self.repo
            .list_by_owner(owner, filter)
            .await
            .map_err(storage_error)
    }

    /// Fetch a character. Another owner's character is reported as `NotFound`.
    pub async fn get(&self, owner: &OwnerId, id: &CharacterId) -> Result<Character, CharacterError> {
        self.repo
            .get_by_id(owner, id)
            .await
            .map_err(storage_error)?
            .ok_or(CharacterError::NotFound)
    }

    /// Merge the present fields into the stored record, re-validate, persist.
    pub async fn update(
        &self,
        owner: &OwnerId,
        id: &CharacterId,
        request: UpdateCharacterRequest,
    ) -> Result<Character, CharacterError> {
        let mut character = self.get(owner, id).await?;

        if let Some(name) = request.name {
            character.name = name.trim().to_string();
        }
        if let Some(level) = request.level {
            character.level = level;
        }
        if let Some(role) = request.role {
            character.role = role;
        }
        if let Some(archetype) = request.archetype {
            character.archetype = archetype;
        }
        if let Some(stats) = request.stats {
            character.stats = stats;
        }
        if let Some(skills) = request.skills {
            character.skills = skills;
        }

        self.enforce(&character.draft())?;
        character.updated_at = Utc::now();

        let character = self.repo.update(&character).await.map_err(storage_error)?;
        tracing::debug!(owner = %owner, id = %character.id, "character updated");
        Ok(character)
    }

    /// Delete a character, returning the record as it was.
    pub async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<Character, CharacterError> {
        let character = self.get(owner, id).await?;
        self.repo
            .delete(owner, id)
            .await
            .map_err(storage_error)?;
        tracing::debug!(owner = %owner, id = %id, "character deleted");
        Ok(character)
    }

    /// Total count, mean level (one decimal), and count per role for one owner.
    pub async fn stats(&self, owner: &OwnerId) -> Result<CharacterStats, CharacterError> {
        let characters = self.list(owner, &CharacterFilter::default()).await?;

        let total = characters.len();
        let average_level = if total == 0 {
            0.0
        } else {
            let sum: u64 = characters.iter().map(|c| u64::from(c.level)).sum();
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        };

        let mut role_breakdown = BTreeMap::new();
        for character in &characters {
            *role_breakdown.entry(character.role.clone()).or_insert(0) += 1;
        }

        Ok(CharacterStats {
            total_characters: total,
            average_level,
            role_breakdown,
        })
    }

    /// Dry-run validation; nothing is persisted.
    pub fn validate(&self, draft: &CharacterDraft) -> ValidationReport {
        self.rules.validate(draft)
    }

    pub async fn sheet(&self, owner: &OwnerId, id: &CharacterId) -> Result<CharacterSheet, CharacterError> {
        let character = self.get(owner, id).await?;
        Ok(CharacterSheet::build(character, &self.rules))
    }

    fn enforce(&self, draft: &CharacterDraft) -> Result<(), CharacterError> {
        let report = self.rules.validate(draft);
        if report.valid {
            return Ok(());
        }
        match self.enforcement {
            Enforcement::Reject => Err(CharacterError::Invalid(Box::new(report))),
            Enforcement::Warn => {
                tracing::warn!(
                    name = %draft.name,
                    violations = report.violations.len(),
                    "saving character with rule violations: {}",
                    report.summary()
                );
                Ok(())
            }
        }
    }
}

fn storage_error(e: RepositoryError) -> CharacterError {
    match e {
        RepositoryError::NotFound => CharacterError::NotFound,
        other => CharacterError::StorageError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use primus_types::config::RulesConfig;

    use crate::catalog::GameCatalog;
    use crate::repository::box_character::BoxCharacterRepository;
    use crate::repository::character::filter_and_sort;

    /// Vec-backed repository for exercising the service.
    #[derive(Default)]
    struct VecRepository {
        rows: Mutex<Vec<Character>>,
    }

    impl CharacterRepository for VecRepository {
        async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
            self.rows.lock().unwrap().push(character.clone());
            Ok(character.clone())
        }

        async fn list_by_owner(
            &self,
            owner: &OwnerId,
            filter: &CharacterFilter,
        ) -> Result<Vec<Character>, RepositoryError> {
            let rows: Vec<Character> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| &c.owner_id == owner)
                .cloned()
                .collect();
            Ok(filter_and_sort(rows, filter))
        }

        async fn get_by_id(
            &self,
            owner: &OwnerId,
            id: &CharacterId,
        ) -> Result<Option<Character>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| &c.id == id && &c.owner_id == owner)
                .cloned())
        }

        async fn update(&self, character: &Character) -> Result<Character, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|c| c.id == character.id && c.owner_id == character.owner_id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = character.clone();
            Ok(character.clone())
        }

        async fn delete(&self, owner: &OwnerId, id: &CharacterId) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|c| !(&c.id == id && &c.owner_id == owner));
            if rows.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
    }

    fn service(enforcement: Enforcement) -> CharacterService<BoxCharacterRepository> {
        let rules =
            ProgressionRules::new(&RulesConfig::default(), Arc::new(GameCatalog::builtin())).unwrap();
        CharacterService::new(
            BoxCharacterRepository::new(VecRepository::default()),
            Arc::new(rules),
            enforcement,
        )
    }

    fn request(name: &str, role: &str, archetype: &str) -> CreateCharacterRequest {
        CreateCharacterRequest {
            name: name.to_string(),
            level: None,
            role: role.to_string(),
            archetype: archetype.to_string(),
            stats: None,
            skills: None,
        }
    }

    fn alice() -> OwnerId {
        OwnerId::new("alice")
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let svc = service(Enforcement::Reject);
        let c = svc
            .create(&alice(), request("  Aria  ", "scout", "ranger"))
            .await
            .unwrap();
        assert_eq!(c.name, "Aria");
        assert_eq!(c.level, 1);
        assert_eq!(c.stats, AbilityScores::uniform(8));
        assert!(c.skills.is_empty());
        assert_eq!(c.owner_id, alice());
        assert_eq!(c.created_at, c.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_violations() {
        let svc = service(Enforcement::Reject);
        let mut req = request("Aria", "scout", "wizard");
        req.stats = Some(AbilityScores::from_array([15, 15, 15, 9, 8, 8]));
        let err = svc.create(&alice(), req).await.unwrap_err();
        match err {
            CharacterError::Invalid(report) => {
                let codes: Vec<&str> = report.violations.iter().map(|v| v.code()).collect();
                assert_eq!(codes, vec!["ARCHETYPE_ROLE_MISMATCH", "BUDGET_EXCEEDED"]);
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(svc.list(&alice(), &CharacterFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_warn_enforcement_persists() {
        let svc = service(Enforcement::Warn);
        let mut req = request("Aria", "scout", "ranger");
        req.skills = Some(vec!["archery".to_string(), "stealth".to_string()]);
        let c = svc.create(&alice(), req).await.unwrap();
        assert_eq!(c.skills.len(), 2);

        let sheet = svc.sheet(&alice(), &c.id).await.unwrap();
        assert_eq!(sheet.violations.len(), 1);
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let svc = service(Enforcement::Reject);
        let c = svc
            .create(&alice(), request("Aria", "scout", "ranger"))
            .await
            .unwrap();
        let mallory = OwnerId::new("mallory");

        assert!(matches!(svc.get(&mallory, &c.id).await, Err(CharacterError::NotFound)));
        assert!(matches!(
            svc.update(&mallory, &c.id, UpdateCharacterRequest::default()).await,
            Err(CharacterError::NotFound)
        ));
        assert!(matches!(svc.delete(&mallory, &c.id).await, Err(CharacterError::NotFound)));
        assert!(matches!(svc.sheet(&mallory, &c.id).await, Err(CharacterError::NotFound)));
        assert_eq!(svc.stats(&mallory).await.unwrap().total_characters, 0);
        assert!(svc.get(&alice(), &c.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates() {
        let svc = service(Enforcement::Reject);
        let c = svc
            .create(&alice(), request("Aria", "scout", "ranger"))
            .await
            .unwrap();

        let updated = svc
            .update(
                &alice(),
                &c.id,
                UpdateCharacterRequest {
                    level: Some(3),
                    skills: Some(vec!["archery".to_string(), "tracking".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.level, 3);
        assert_eq!(updated.name, "Aria");
        assert!(updated.updated_at >= c.updated_at);

        let err = svc
            .update(
                &alice(),
                &c.id,
                UpdateCharacterRequest {
                    level: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CharacterError::Invalid(_)));
        assert_eq!(svc.get(&alice(), &c.id).await.unwrap().level, 3);
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let svc = service(Enforcement::Reject);
        let c = svc
            .create(&alice(), request("Aria", "scout", "ranger"))
            .await
            .unwrap();
        let deleted = svc.delete(&alice(), &c.id).await.unwrap();
        assert_eq!(deleted.name, "Aria");
        assert!(matches!(svc.get(&alice(), &c.id).await, Err(CharacterError::NotFound)));
        assert!(matches!(svc.delete(&alice(), &c.id).await, Err(CharacterError::NotFound)));
    }

    #[tokio::test]
    async fn test_stats() {
        let svc = service(Enforcement::Reject);
        for (name, role, archetype, level) in [
            ("A", "scout", "ranger", 1),
            ("B", "warrior", "guardian", 2),
            ("C", "warrior", "berserker", 2),
        ] {
            let mut req = request(name, role, archetype);
            req.level = Some(level);
            svc.create(&alice(), req).await.unwrap();
        }
        let stats = svc.stats(&alice()).await.unwrap();
        assert_eq!(stats.total_characters, 3);
        assert_eq!(stats.average_level, 1.7);
        assert_eq!(stats.role_breakdown.get("warrior"), Some(&2));
        assert_eq!(stats.role_breakdown.get("scout"), Some(&1));
    }

    #[tokio::test]
    async fn test_validate_is_dry_run() {
        let svc = service(Enforcement::Reject);
        let draft = CharacterDraft {
            name: "Ghost".to_string(),
            level: 1,
            role: "mystic".to_string(),
            archetype: "cleric".to_string(),
            stats: AbilityScores::uniform(8),
            skills: vec!["healing".to_string()],
        };
        assert!(svc.validate(&draft).valid);
        assert!(svc.list(&alice(), &CharacterFilter::default()).await.unwrap().is_empty());
    }
}
