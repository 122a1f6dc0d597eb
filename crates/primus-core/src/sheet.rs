//! Derived, display-ready view of a stored character.
//!
//! Nothing here is persisted: modifiers, archetype-adjusted scores, point-buy
//! usage, and tier usage are recomputed from the base record every time.

use std::fmt::Write as _;

use serde::Serialize;

use primus_types::catalog::{Archetype, Role, Skill};
use primus_types::character::{Ability, Character, ability_modifier, format_modifier};
use primus_types::rules::{PointBuySummary, RuleViolation, TierUsage};

use crate::rules::ProgressionRules;

/// One row of the ability block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub ability: Ability,
    pub base: u8,
    /// Archetype bonus (0 when none).
    pub bonus: u8,
    pub effective: u8,
    /// Modifier of the effective score.
    pub modifier: i32,
}

/// A character plus everything derived from it for display or export.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSheet {
    pub character: Character,
    pub role: Option<Role>,
    pub archetype: Option<Archetype>,
    /// Catalog entries for the selected skills, in selection order.
    pub skills: Vec<Skill>,
    pub abilities: Vec<AbilityLine>,
    pub point_buy: PointBuySummary,
    pub tiers: Vec<TierUsage>,
    /// Rules the stored record currently breaks (possible under warn enforcement
    /// or after a rules change).
    pub violations: Vec<RuleViolation>,
}

impl CharacterSheet {
    pub fn build(character: Character, rules: &ProgressionRules) -> Self {
        let catalog = rules.catalog();
        let role = catalog.role(&character.role).cloned();
        let archetype = catalog.archetype(&character.archetype).cloned();
        let skills = character
            .skills
            .iter()
            .filter_map(|id| catalog.skill(id).cloned())
            .collect();

        let bonuses = archetype
            .as_ref()
            .map(|a| a.bonuses.clone())
            .unwrap_or_default();
        let effective = character.stats.with_bonuses(&bonuses);
        let abilities = Ability::ALL
            .into_iter()
            .map(|ability| {
                let score = effective.get(ability);
                AbilityLine {
                    ability,
                    base: character.stats.get(ability),
                    bonus: bonuses.get(&ability).copied().unwrap_or(0),
                    effective: score,
                    modifier: ability_modifier(score),
                }
            })
            .collect();

        let report = rules.validate(&character.draft());

        Self {
            character,
            role,
            archetype,
            skills,
            abilities,
            point_buy: report.point_buy,
            tiers: report.tiers,
            violations: report.violations,
        }
    }

    /// Plain-text printable sheet.
    pub fn render_text(&self) -> String {
        let c = &self.character;
        let mut out = String::new();

        let role_name = self.role.as_ref().map_or(c.role.as_str(), |r| r.name.as_str());
        let archetype_name = self
            .archetype
            .as_ref()
            .map_or(c.archetype.as_str(), |a| a.name.as_str());

        let _ = writeln!(out, "{}", c.name);
        let _ = writeln!(out, "Level {} {} ({})", c.level, role_name, archetype_name);
        let _ = writeln!(out);

        let _ = writeln!(out, "{:<5} {:>4} {:>5} {:>5} {:>4}", "", "BASE", "BONUS", "TOTAL", "MOD");
        for line in &self.abilities {
            let _ = writeln!(
                out,
                "{:<5} {:>4} {:>5} {:>5} {:>4}",
                line.ability.abbreviation(),
                line.base,
                if line.bonus > 0 { format!("+{}", line.bonus) } else { String::new() },
                line.effective,
                format_modifier(line.modifier),
            );
        }
        let _ = writeln!(
            out,
            "Point buy: {} / {} points used",
            self.point_buy.spent, self.point_buy.budget
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Skills");
        for usage in &self.tiers {
            let names: Vec<&str> = self
                .skills
                .iter()
                .filter(|s| s.tier == usage.tier)
                .map(|s| s.name.as_str())
                .collect();
            let listed = if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            };
            let _ = writeln!(
                out,
                "  Tier {} ({}/{}): {}",
                usage.tier.number(),
                usage.selected,
                usage.cap,
                listed
            );
        }

        if !self.violations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Rule violations");
            for violation in &self.violations {
                let _ = writeln!(out, "  - {violation}");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use primus_types::auth::OwnerId;
    use primus_types::character::{AbilityScores, CharacterId};
    use primus_types::config::RulesConfig;

    use crate::catalog::GameCatalog;

    fn rules() -> ProgressionRules {
        ProgressionRules::new(&RulesConfig::default(), Arc::new(GameCatalog::builtin())).unwrap()
    }

    fn wizard() -> Character {
        let now = Utc::now();
        Character {
            id: CharacterId::new(),
            owner_id: OwnerId::new("alice"),
            name: "Elminster".to_string(),
            level: 6,
            role: "scholar".to_string(),
            archetype: "wizard".to_string(),
            stats: AbilityScores::from_array([8, 14, 12, 15, 13, 8]),
            skills: vec!["arcane-lore".to_string(), "archmage-power".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_effective_scores_include_archetype_bonuses() {
        let sheet = CharacterSheet::build(wizard(), &rules());
        let int = sheet.abilities[3];
        assert_eq!(int.ability, Ability::Intelligence);
        assert_eq!(int.base, 15);
        assert_eq!(int.bonus, 2);
        assert_eq!(int.effective, 17);
        assert_eq!(int.modifier, 3);

        let strength = sheet.abilities[0];
        assert_eq!(strength.bonus, 0);
        assert_eq!(strength.modifier, -1);
    }

    #[test]
    fn test_sheet_resolves_catalog_entries() {
        let sheet = CharacterSheet::build(wizard(), &rules());
        assert_eq!(sheet.role.as_ref().unwrap().name, "Scholar");
        assert_eq!(sheet.skills.len(), 2);
        assert!(sheet.violations.is_empty());
        assert_eq!(sheet.point_buy.spent, 7 + 4 + 9 + 5);
    }

    #[test]
    fn test_render_text() {
        let text = CharacterSheet::build(wizard(), &rules()).render_text();
        assert!(text.starts_with("Elminster\nLevel 6 Scholar (Wizard)"));
        assert!(text.contains("INT"));
        assert!(text.contains("Point buy: 25 / 27 points used"));
        assert!(text.contains("Tier 3 (1/1): Archmage Power"));
        assert!(!text.contains("Rule violations"));
    }

    #[test]
    fn test_render_lists_violations() {
        let mut c = wizard();
        c.level = 1;
        let text = CharacterSheet::build(c, &rules()).render_text();
        assert!(text.contains("Rule violations"));
        assert!(text.contains("tier 3"));
    }
}
