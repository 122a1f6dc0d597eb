use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::OwnerId;

/// Unique identifier for a character, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new CharacterId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a CharacterId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The six ability scores.
///
/// Serialized in long form (`"strength"`); the conventional three-letter
/// abbreviations are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    #[serde(alias = "str", alias = "STR")]
    Strength,
    #[serde(alias = "dex", alias = "DEX")]
    Dexterity,
    #[serde(alias = "con", alias = "CON")]
    Constitution,
    #[serde(alias = "int", alias = "INT")]
    Intelligence,
    #[serde(alias = "wis", alias = "WIS")]
    Wisdom,
    #[serde(alias = "cha", alias = "CHA")]
    Charisma,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Three-letter abbreviation used on printed sheets.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    /// Capitalized display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ability::Strength => write!(f, "strength"),
            Ability::Dexterity => write!(f, "dexterity"),
            Ability::Constitution => write!(f, "constitution"),
            Ability::Intelligence => write!(f, "intelligence"),
            Ability::Wisdom => write!(f, "wisdom"),
            Ability::Charisma => write!(f, "charisma"),
        }
    }
}

impl FromStr for Ability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "constitution" | "con" => Ok(Ability::Constitution),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            other => Err(format!("invalid ability: '{other}'")),
        }
    }
}

/// Partial map of ability bonuses granted by an archetype.
pub type AbilityBonuses = BTreeMap<Ability, u8>;

/// Six named ability scores.
///
/// The stored values are the base (point-buy) scores. Modifiers and
/// archetype-adjusted scores are derived on read and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityScores {
    #[serde(alias = "str", alias = "STR")]
    pub strength: u8,
    #[serde(alias = "dex", alias = "DEX")]
    pub dexterity: u8,
    #[serde(alias = "con", alias = "CON")]
    pub constitution: u8,
    #[serde(alias = "int", alias = "INT")]
    pub intelligence: u8,
    #[serde(alias = "wis", alias = "WIS")]
    pub wisdom: u8,
    #[serde(alias = "cha", alias = "CHA")]
    pub charisma: u8,
}

impl AbilityScores {
    /// Scores with every ability set to `value`.
    pub fn uniform(value: u8) -> Self {
        Self {
            strength: value,
            dexterity: value,
            constitution: value,
            intelligence: value,
            wisdom: value,
            charisma: value,
        }
    }

    /// Build from an array in sheet order (STR, DEX, CON, INT, WIS, CHA).
    pub fn from_array(values: [u8; 6]) -> Self {
        Self {
            strength: values[0],
            dexterity: values[1],
            constitution: values[2],
            intelligence: values[3],
            wisdom: values[4],
            charisma: values[5],
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Copy with one ability replaced.
    pub fn with(mut self, ability: Ability, value: u8) -> Self {
        self.set(ability, value);
        self
    }

    /// Iterate `(ability, score)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, u8)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    /// Modifier for one ability: `floor((score - 10) / 2)`.
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }

    /// Scores with archetype bonuses applied (saturating at `u8::MAX`).
    pub fn with_bonuses(&self, bonuses: &AbilityBonuses) -> Self {
        let mut out = *self;
        for (ability, bonus) in bonuses {
            out.set(*ability, self.get(*ability).saturating_add(*bonus));
        }
        out
    }
}

/// Modifier for a raw score, rounding toward negative infinity.
///
/// ```
/// use primus_types::character::ability_modifier;
///
/// assert_eq!(ability_modifier(10), 0);
/// assert_eq!(ability_modifier(15), 2);
/// assert_eq!(ability_modifier(9), -1);
/// assert_eq!(ability_modifier(1), -5);
/// ```
pub fn ability_modifier(score: u8) -> i32 {
    (i32::from(score) - 10).div_euclid(2)
}

/// Render a modifier with an explicit sign (`+2`, `0` as `+0`, `-1`).
pub fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{modifier}")
    } else {
        modifier.to_string()
    }
}

/// A stored character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    /// Owner this record is scoped to.
    pub owner_id: OwnerId,
    pub name: String,
    pub level: u32,
    /// Role id from the game catalog.
    pub role: String,
    /// Archetype id from the game catalog.
    pub archetype: String,
    /// Base ability scores.
    pub stats: AbilityScores,
    /// Selected skill ids.
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// The rule-relevant subset of this record.
    pub fn draft(&self) -> CharacterDraft {
        CharacterDraft {
            name: self.name.clone(),
            level: self.level,
            role: self.role.clone(),
            archetype: self.archetype.clone(),
            stats: self.stats,
            skills: self.skills.clone(),
        }
    }
}

/// The in-progress values the rule engine validates.
///
/// Owned by the caller; validators never retain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub level: u32,
    pub role: String,
    pub archetype: String,
    pub stats: AbilityScores,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Request to create a new character. Level, stats and skills default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub level: Option<u32>,
    pub role: String,
    pub archetype: String,
    pub stats: Option<AbilityScores>,
    pub skills: Option<Vec<String>>,
}

/// Partial update; only present fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub level: Option<u32>,
    pub role: Option<String>,
    pub archetype: Option<String>,
    pub stats: Option<AbilityScores>,
    pub skills: Option<Vec<String>>,
}

/// Owner-scoped summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub total_characters: usize,
    /// Mean level rounded to one decimal; 0.0 when there are no characters.
    pub average_level: f64,
    /// Character count keyed by role id.
    pub role_breakdown: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_display_roundtrip() {
        let id = CharacterId::new();
        let parsed: CharacterId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_modifier_floors_toward_negative() {
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn test_format_modifier() {
        assert_eq!(format_modifier(2), "+2");
        assert_eq!(format_modifier(0), "+0");
        assert_eq!(format_modifier(-1), "-1");
    }

    #[test]
    fn test_scores_get_set() {
        let mut scores = AbilityScores::uniform(8);
        scores.set(Ability::Wisdom, 15);
        assert_eq!(scores.get(Ability::Wisdom), 15);
        assert_eq!(scores.modifier(Ability::Wisdom), 2);
        assert_eq!(scores.iter().filter(|(_, s)| *s == 8).count(), 5);
    }

    #[test]
    fn test_with_bonuses() {
        let scores = AbilityScores::uniform(10);
        let bonuses = AbilityBonuses::from([(Ability::Constitution, 2), (Ability::Strength, 1)]);
        let effective = scores.with_bonuses(&bonuses);
        assert_eq!(effective.constitution, 12);
        assert_eq!(effective.strength, 11);
        assert_eq!(effective.charisma, 10);
    }

    #[test]
    fn test_scores_accept_abbreviations() {
        let json = r#"{"STR":15,"DEX":14,"CON":13,"INT":8,"WIS":8,"CHA":8}"#;
        let scores: AbilityScores = serde_json::from_str(json).unwrap();
        assert_eq!(scores, AbilityScores::from_array([15, 14, 13, 8, 8, 8]));
    }

    #[test]
    fn test_scores_reject_negative() {
        let json = r#"{"strength":-1,"dexterity":8,"constitution":8,"intelligence":8,"wisdom":8,"charisma":8}"#;
        assert!(serde_json::from_str::<AbilityScores>(json).is_err());
    }

    #[test]
    fn test_ability_from_str() {
        assert_eq!("DEX".parse::<Ability>().unwrap(), Ability::Dexterity);
        assert_eq!("charisma".parse::<Ability>().unwrap(), Ability::Charisma);
        assert!("luck".parse::<Ability>().is_err());
    }

    #[test]
    fn test_bonus_map_serde() {
        let bonuses = AbilityBonuses::from([(Ability::Wisdom, 2)]);
        let json = serde_json::to_string(&bonuses).unwrap();
        assert_eq!(json, r#"{"wisdom":2}"#);
    }
}
