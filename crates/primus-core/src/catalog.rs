//! Immutable game catalog: roles, archetypes, and skills.
//!
//! Built once at startup (from the built-in tables or a TOML file) and shared
//! behind an `Arc`. Nothing mutates it afterwards; the rule engine receives it
//! as an injected dependency.

use std::collections::{HashMap, HashSet};

use primus_types::catalog::{Archetype, CatalogTables, Role, Skill, SkillTier};
use primus_types::character::Ability;
use primus_types::error::CatalogError;

/// Read-only lookup over the reference tables.
#[derive(Debug, Clone)]
pub struct GameCatalog {
    tables: CatalogTables,
    roles_by_id: HashMap<String, usize>,
    archetypes_by_id: HashMap<String, usize>,
    skills_by_id: HashMap<String, usize>,
}

impl GameCatalog {
    /// Build a catalog, checking id uniqueness and cross-table references.
    pub fn from_tables(tables: CatalogTables) -> Result<Self, CatalogError> {
        let roles_by_id = index_unique("role", tables.roles.iter().map(|r| r.id.as_str()))?;
        let archetypes_by_id =
            index_unique("archetype", tables.archetypes.iter().map(|a| a.id.as_str()))?;
        let skills_by_id = index_unique("skill", tables.skills.iter().map(|s| s.id.as_str()))?;

        for archetype in &tables.archetypes {
            if !roles_by_id.contains_key(&archetype.role_id) {
                return Err(CatalogError::UnknownArchetypeRole {
                    archetype: archetype.id.clone(),
                    role: archetype.role_id.clone(),
                });
            }
        }

        for skill in &tables.skills {
            for role in skill.roles.iter().flatten() {
                if !roles_by_id.contains_key(role) {
                    return Err(CatalogError::UnknownSkillRole {
                        skill: skill.id.clone(),
                        role: role.clone(),
                    });
                }
            }
        }

        Ok(Self {
            tables,
            roles_by_id,
            archetypes_by_id,
            skills_by_id,
        })
    }

    /// Parse and validate a catalog from TOML (`[[roles]]`, `[[archetypes]]`, `[[skills]]`).
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let tables: CatalogTables =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_tables(tables)
    }

    /// The standard Primus tables: four roles, eight archetypes, sixteen skills.
    pub fn builtin() -> Self {
        let tables = builtin_tables();
        // Built-in ids are unique and cross-referenced; see test_builtin_catalog_is_valid.
        Self {
            roles_by_id: index(tables.roles.iter().map(|r| r.id.as_str())),
            archetypes_by_id: index(tables.archetypes.iter().map(|a| a.id.as_str())),
            skills_by_id: index(tables.skills.iter().map(|s| s.id.as_str())),
            tables,
        }
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles_by_id.get(id).map(|&i| &self.tables.roles[i])
    }

    pub fn archetype(&self, id: &str) -> Option<&Archetype> {
        self.archetypes_by_id
            .get(id)
            .map(|&i| &self.tables.archetypes[i])
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills_by_id.get(id).map(|&i| &self.tables.skills[i])
    }

    pub fn roles(&self) -> &[Role] {
        &self.tables.roles
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.tables.archetypes
    }

    pub fn skills(&self) -> &[Skill] {
        &self.tables.skills
    }

    /// Archetypes belonging to a role, in table order.
    pub fn archetypes_for_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Archetype> {
        self.tables.archetypes.iter().filter(move |a| a.role_id == role)
    }

    /// Skills of one tier, in table order.
    pub fn skills_in_tier(&self, tier: SkillTier) -> impl Iterator<Item = &Skill> {
        self.tables.skills.iter().filter(move |s| s.tier == tier)
    }

    /// The underlying tables (for serialization).
    pub fn tables(&self) -> &CatalogTables {
        &self.tables
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn index<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    ids.enumerate().map(|(i, id)| (id.to_string(), i)).collect()
}

fn index_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>, CatalogError> {
    let mut seen = HashSet::new();
    let mut map = HashMap::new();
    for (i, id) in ids.enumerate() {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
        map.insert(id.to_string(), i);
    }
    Ok(map)
}

fn role(id: &str, name: &str, description: &str, primary: [Ability; 2], recommended: [&str; 3]) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        primary_stats: primary.to_vec(),
        recommended_skills: recommended.iter().map(|s| s.to_string()).collect(),
    }
}

fn archetype(id: &str, name: &str, description: &str, role_id: &str, bonuses: [(Ability, u8); 2]) -> Archetype {
    Archetype {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        role_id: role_id.to_string(),
        bonuses: bonuses.into_iter().collect(),
    }
}

fn skill(id: &str, name: &str, tier: SkillTier, description: &str, roles: &[&str]) -> Skill {
    Skill {
        id: id.to_string(),
        name: name.to_string(),
        tier,
        description: description.to_string(),
        roles: Some(roles.iter().map(|r| r.to_string()).collect()),
    }
}

fn builtin_tables() -> CatalogTables {
    use Ability::*;
    use SkillTier::*;

    CatalogTables {
        roles: vec![
            role(
                "warrior",
                "Warrior",
                "Masters of combat and physical prowess, warriors excel in melee combat and protecting allies.",
                [Strength, Constitution],
                ["combat-mastery", "shield-wall", "intimidation"],
            ),
            role(
                "scout",
                "Scout",
                "Agile and perceptive, scouts specialize in reconnaissance, ranged combat, and survival.",
                [Dexterity, Wisdom],
                ["archery", "stealth", "tracking"],
            ),
            role(
                "scholar",
                "Scholar",
                "Students of arcane knowledge, scholars wield magic and possess vast intellectual abilities.",
                [Intelligence, Wisdom],
                ["arcane-lore", "ritual-magic", "investigation"],
            ),
            role(
                "mystic",
                "Mystic",
                "Connected to divine or natural forces, mystics heal allies and commune with otherworldly powers.",
                [Wisdom, Charisma],
                ["divine-channeling", "healing", "nature-bond"],
            ),
        ],
        archetypes: vec![
            archetype("guardian", "Guardian", "A defensive specialist focused on protecting allies.", "warrior", [(Constitution, 2), (Strength, 1)]),
            archetype("berserker", "Berserker", "A fierce combatant who channels rage into devastating attacks.", "warrior", [(Strength, 2), (Constitution, 1)]),
            archetype("ranger", "Ranger", "A wilderness expert skilled in tracking and survival.", "scout", [(Wisdom, 2), (Dexterity, 1)]),
            archetype("assassin", "Assassin", "A deadly infiltrator who strikes from the shadows.", "scout", [(Dexterity, 2), (Intelligence, 1)]),
            archetype("wizard", "Wizard", "A master of arcane magic through study and preparation.", "scholar", [(Intelligence, 2), (Wisdom, 1)]),
            archetype("artificer", "Artificer", "A magical inventor who crafts wondrous items and constructs.", "scholar", [(Intelligence, 2), (Dexterity, 1)]),
            archetype("cleric", "Cleric", "A divine servant who channels the power of their deity.", "mystic", [(Wisdom, 2), (Charisma, 1)]),
            archetype("druid", "Druid", "A guardian of nature who can shapeshift and command the elements.", "mystic", [(Wisdom, 2), (Constitution, 1)]),
        ],
        skills: vec![
            skill("combat-mastery", "Combat Mastery", Basic, "Proficiency with weapons and basic combat techniques.", &["warrior"]),
            skill("archery", "Archery", Basic, "Skill with bows and ranged weapons.", &["scout"]),
            skill("arcane-lore", "Arcane Lore", Basic, "Knowledge of magical theory and spell identification.", &["scholar"]),
            skill("healing", "Healing", Basic, "Ability to restore health and treat injuries.", &["mystic"]),
            skill("stealth", "Stealth", Basic, "Moving unseen and unheard.", &["scout", "warrior"]),
            skill("investigation", "Investigation", Basic, "Gathering clues and solving mysteries.", &["scholar", "scout"]),
            skill("shield-wall", "Shield Wall", Advanced, "Advanced defensive formations and protection techniques.", &["warrior"]),
            skill("tracking", "Tracking", Advanced, "Following trails and hunting quarry through any terrain.", &["scout"]),
            skill("ritual-magic", "Ritual Magic", Advanced, "Casting powerful spells through extended ceremonies.", &["scholar", "mystic"]),
            skill("divine-channeling", "Divine Channeling", Advanced, "Manifesting divine power for healing or harm.", &["mystic"]),
            skill("intimidation", "Intimidation", Advanced, "Using presence and threats to influence others.", &["warrior"]),
            skill("nature-bond", "Nature Bond", Advanced, "Deep connection with natural forces and creatures.", &["mystic", "scout"]),
            skill("weapon-mastery", "Weapon Mastery", Master, "Legendary skill with weapons, unlocking devastating techniques.", &["warrior"]),
            skill("shadow-step", "Shadow Step", Master, "Teleporting through shadows and becoming one with darkness.", &["scout"]),
            skill("archmage-power", "Archmage Power", Master, "Access to reality-altering magic and forbidden knowledge.", &["scholar"]),
            skill("divine-avatar", "Divine Avatar", Master, "Becoming a vessel for divine power and transcendent abilities.", &["mystic"]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let validated = GameCatalog::from_tables(builtin_tables()).unwrap();
        assert_eq!(validated.roles().len(), 4);
        assert_eq!(validated.archetypes().len(), 8);
        assert_eq!(validated.skills().len(), 16);
    }

    #[test]
    fn test_lookups() {
        let catalog = GameCatalog::builtin();
        assert_eq!(catalog.role("scout").unwrap().name, "Scout");
        assert_eq!(catalog.archetype("druid").unwrap().role_id, "mystic");
        assert_eq!(catalog.skill("shadow-step").unwrap().tier, SkillTier::Master);
        assert!(catalog.skill("fireball").is_none());
    }

    #[test]
    fn test_archetypes_for_role() {
        let catalog = GameCatalog::builtin();
        let ids: Vec<&str> = catalog
            .archetypes_for_role("scholar")
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["wizard", "artificer"]);
    }

    #[test]
    fn test_skills_in_tier() {
        let catalog = GameCatalog::builtin();
        assert_eq!(catalog.skills_in_tier(SkillTier::Basic).count(), 6);
        assert_eq!(catalog.skills_in_tier(SkillTier::Advanced).count(), 6);
        assert_eq!(catalog.skills_in_tier(SkillTier::Master).count(), 4);
    }

    #[test]
    fn test_recommended_skills_exist() {
        let catalog = GameCatalog::builtin();
        for role in catalog.roles() {
            for skill_id in &role.recommended_skills {
                assert!(catalog.skill(skill_id).is_some(), "{skill_id} missing");
            }
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut tables = builtin_tables();
        tables.skills.push(tables.skills[0].clone());
        let err = GameCatalog::from_tables(tables).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateId {
                kind: "skill",
                id: "combat-mastery".to_string()
            }
        );
    }

    #[test]
    fn test_dangling_role_references_rejected() {
        let mut tables = builtin_tables();
        tables.archetypes[0].role_id = "paladin".to_string();
        assert!(matches!(
            GameCatalog::from_tables(tables),
            Err(CatalogError::UnknownArchetypeRole { .. })
        ));

        let mut tables = builtin_tables();
        tables.skills[0].roles = Some(vec!["bard".to_string()]);
        assert!(matches!(
            GameCatalog::from_tables(tables),
            Err(CatalogError::UnknownSkillRole { .. })
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let catalog = GameCatalog::from_toml_str(
            r#"
[[roles]]
id = "bard"
name = "Bard"
description = "Sings."

[[skills]]
id = "lute"
name = "Lute"
tier = 1
description = "Plays the lute."
"#,
        )
        .unwrap();
        assert_eq!(catalog.roles().len(), 1);
        assert!(catalog.skill("lute").unwrap().is_available_to("anyone"));

        assert!(matches!(
            GameCatalog::from_toml_str("roles = 5"),
            Err(CatalogError::Parse(_))
        ));
    }
}
