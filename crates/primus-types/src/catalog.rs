//! Static reference tables: roles, archetypes, and skills.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::{Ability, AbilityBonuses};

/// Skill power bracket, gated by character level.
///
/// Serialized as its number (1, 2, 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SkillTier {
    Basic,
    Advanced,
    Master,
}

impl SkillTier {
    pub const ALL: [SkillTier; 3] = [SkillTier::Basic, SkillTier::Advanced, SkillTier::Master];

    pub fn number(self) -> u8 {
        match self {
            SkillTier::Basic => 1,
            SkillTier::Advanced => 2,
            SkillTier::Master => 3,
        }
    }

    /// Lowest character level at which this tier has a non-zero cap.
    pub fn unlock_level(self) -> u32 {
        match self {
            SkillTier::Basic => 1,
            SkillTier::Advanced => 3,
            SkillTier::Master => 6,
        }
    }
}

impl From<SkillTier> for u8 {
    fn from(tier: SkillTier) -> Self {
        tier.number()
    }
}

impl TryFrom<u8> for SkillTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SkillTier::Basic),
            2 => Ok(SkillTier::Advanced),
            3 => Ok(SkillTier::Master),
            other => Err(format!("invalid skill tier: {other} (expected 1, 2 or 3)")),
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.number())
    }
}

/// A character role (class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Abilities this role leans on.
    #[serde(default)]
    pub primary_stats: Vec<Ability>,
    /// Skill ids suggested to new characters of this role.
    #[serde(default)]
    pub recommended_skills: Vec<String>,
}

/// A specialization within a role, granting ability bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Id of the role this archetype belongs to.
    pub role_id: String,
    #[serde(default)]
    pub bonuses: AbilityBonuses,
}

/// One entry of the skill catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub tier: SkillTier,
    pub description: String,
    /// Roles allowed to take this skill. `None` (or empty) means every role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Skill {
    /// Whether a character of `role` may select this skill.
    pub fn is_available_to(&self, role: &str) -> bool {
        match &self.roles {
            None => true,
            Some(roles) if roles.is_empty() => true,
            Some(roles) => roles.iter().any(|r| r == role),
        }
    }
}

/// Serializable form of the whole catalog (built-in tables or a TOML file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTables {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_serializes_as_number() {
        assert_eq!(serde_json::to_string(&SkillTier::Advanced).unwrap(), "2");
        let tier: SkillTier = serde_json::from_str("3").unwrap();
        assert_eq!(tier, SkillTier::Master);
        assert!(serde_json::from_str::<SkillTier>("4").is_err());
    }

    #[test]
    fn test_unrestricted_skill_available_to_all() {
        let skill = Skill {
            id: "first-aid".to_string(),
            name: "First Aid".to_string(),
            tier: SkillTier::Basic,
            description: String::new(),
            roles: None,
        };
        assert!(skill.is_available_to("warrior"));

        let empty = Skill {
            roles: Some(Vec::new()),
            ..skill.clone()
        };
        assert!(empty.is_available_to("mystic"));

        let restricted = Skill {
            roles: Some(vec!["scout".to_string()]),
            ..skill
        };
        assert!(restricted.is_available_to("scout"));
        assert!(!restricted.is_available_to("warrior"));
    }

    #[test]
    fn test_catalog_tables_from_toml() {
        let toml_str = r#"
[[roles]]
id = "warrior"
name = "Warrior"
description = "Fights."
primary_stats = ["strength", "constitution"]

[[archetypes]]
id = "guardian"
name = "Guardian"
description = "Protects."
role_id = "warrior"
bonuses = { constitution = 2, strength = 1 }

[[skills]]
id = "shield-wall"
name = "Shield Wall"
tier = 2
description = "Blocks."
roles = ["warrior"]
"#;
        let tables: CatalogTables = toml::from_str(toml_str).unwrap();
        assert_eq!(tables.roles[0].primary_stats, vec![Ability::Strength, Ability::Constitution]);
        assert_eq!(tables.archetypes[0].bonuses.get(&Ability::Constitution), Some(&2));
        assert_eq!(tables.skills[0].tier, SkillTier::Advanced);
    }
}
