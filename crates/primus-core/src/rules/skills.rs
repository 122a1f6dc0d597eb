//! Tiered skill eligibility: level-gated caps and role restrictions.

use std::collections::HashSet;

use primus_types::catalog::{Skill, SkillTier};
use primus_types::rules::{RuleViolation, SelectionReport, TierUsage};

use crate::catalog::GameCatalog;

/// How many skills of `tier` a character of `level` may hold.
///
/// Non-decreasing in level, zero below the tier's unlock level.
///
/// ```
/// use primus_core::rules::skills::tier_cap;
/// use primus_types::catalog::SkillTier;
///
/// assert_eq!(tier_cap(1, SkillTier::Basic), 1);
/// assert_eq!(tier_cap(4, SkillTier::Advanced), 2);
/// assert_eq!(tier_cap(5, SkillTier::Master), 0);
/// ```
pub fn tier_cap(level: u32, tier: SkillTier) -> u32 {
    let level = i64::from(level);
    let cap = match tier {
        SkillTier::Basic => level.min(3),
        SkillTier::Advanced => (level - 2).min(2),
        SkillTier::Master => (level - 5).min(1),
    };
    // level <= 3 after min, so the cast cannot truncate
    cap.max(0) as u32
}

/// Number of selected skills that belong to `tier`. Unknown ids are ignored.
pub fn selected_in_tier(catalog: &GameCatalog, selection: &[String], tier: SkillTier) -> usize {
    selection
        .iter()
        .filter_map(|id| catalog.skill(id))
        .filter(|skill| skill.tier == tier)
        .count()
}

/// Whether `skill_id` may be toggled on (or is already on) for this character.
///
/// An already-selected skill is always selectable so it can be removed.
pub fn is_selectable(
    catalog: &GameCatalog,
    skill_id: &str,
    selection: &[String],
    level: u32,
    role: &str,
) -> bool {
    let Some(skill) = catalog.skill(skill_id) else {
        return false;
    };
    if !skill.is_available_to(role) {
        return false;
    }
    if selection.iter().any(|s| s == skill_id) {
        return true;
    }
    let cap = tier_cap(level, skill.tier) as usize;
    selected_in_tier(catalog, selection, skill.tier) < cap
}

/// Remove the skill if present, add it if selectable, otherwise no change.
pub fn toggle(
    catalog: &GameCatalog,
    skill_id: &str,
    selection: &[String],
    level: u32,
    role: &str,
) -> Vec<String> {
    if selection.iter().any(|s| s == skill_id) {
        return selection
            .iter()
            .filter(|s| *s != skill_id)
            .cloned()
            .collect();
    }
    let mut next = selection.to_vec();
    if is_selectable(catalog, skill_id, selection, level, role) {
        next.push(skill_id.to_string());
    }
    next
}

/// Catalog entries of `tier` that `role` may take.
pub fn available_skills<'a>(
    catalog: &'a GameCatalog,
    tier: SkillTier,
    role: &'a str,
) -> impl Iterator<Item = &'a Skill> {
    catalog
        .skills_in_tier(tier)
        .filter(move |skill| skill.is_available_to(role))
}

/// Selected-vs-cap for every tier, in tier order.
pub fn tier_usage(catalog: &GameCatalog, selection: &[String], level: u32) -> Vec<TierUsage> {
    SkillTier::ALL
        .into_iter()
        .map(|tier| TierUsage {
            tier,
            selected: selected_in_tier(catalog, selection, tier),
            cap: tier_cap(level, tier),
        })
        .collect()
}

/// Check a whole selection, collecting every violation.
///
/// Per-skill problems (unknown, duplicate, wrong role) come first in
/// selection order, then one `TierCapExceeded` per overflowing tier.
pub fn validate_selection(
    catalog: &GameCatalog,
    selection: &[String],
    level: u32,
    role: &str,
) -> SelectionReport {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(selection.len());

    for skill_id in selection {
        if !seen.insert(skill_id.as_str()) {
            violations.push(RuleViolation::DuplicateSkill {
                skill_id: skill_id.clone(),
            });
            continue;
        }
        unique.push(skill_id.clone());

        match catalog.skill(skill_id) {
            None => violations.push(RuleViolation::UnknownSkill {
                skill_id: skill_id.clone(),
            }),
            Some(skill) if !skill.is_available_to(role) => {
                violations.push(RuleViolation::RoleIneligible {
                    skill_id: skill_id.clone(),
                    role: role.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    let tiers = tier_usage(catalog, &unique, level);
    for usage in &tiers {
        if usage.selected > usage.cap as usize {
            violations.push(RuleViolation::TierCapExceeded {
                tier: usage.tier,
                selected: usage.selected,
                cap: usage.cap,
            });
        }
    }

    SelectionReport {
        valid: violations.is_empty(),
        violations,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tier_cap_reference_points() {
        assert_eq!(tier_cap(1, SkillTier::Basic), 1);
        assert_eq!(tier_cap(3, SkillTier::Basic), 3);
        assert_eq!(tier_cap(6, SkillTier::Basic), 3);
        assert_eq!(tier_cap(2, SkillTier::Advanced), 0);
        assert_eq!(tier_cap(4, SkillTier::Advanced), 2);
        assert_eq!(tier_cap(5, SkillTier::Master), 0);
        assert_eq!(tier_cap(6, SkillTier::Master), 1);
        assert_eq!(tier_cap(0, SkillTier::Basic), 0);
    }

    #[test]
    fn test_tier_cap_monotonic_and_unlocks() {
        for tier in SkillTier::ALL {
            let mut previous = 0;
            for level in 0..=50 {
                let cap = tier_cap(level, tier);
                assert!(cap >= previous);
                assert_eq!(cap > 0, level >= tier.unlock_level(), "{tier} at {level}");
                previous = cap;
            }
        }
    }

    #[test]
    fn test_is_selectable() {
        let catalog = GameCatalog::builtin();
        assert!(is_selectable(&catalog, "combat-mastery", &[], 1, "warrior"));
        assert!(!is_selectable(&catalog, "archery", &[], 1, "warrior"));
        assert!(!is_selectable(&catalog, "fireball", &[], 20, "warrior"));
        assert!(!is_selectable(&catalog, "shield-wall", &[], 2, "warrior"));

        let full = ids(&["combat-mastery"]);
        assert!(!is_selectable(&catalog, "stealth", &full, 1, "warrior"));
        assert!(is_selectable(&catalog, "stealth", &full, 2, "warrior"));
    }

    #[test]
    fn test_deselection_always_permitted() {
        let catalog = GameCatalog::builtin();
        // Over cap after a level drop: still removable.
        let selection = ids(&["combat-mastery", "stealth", "shield-wall"]);
        for skill_id in &selection {
            assert!(is_selectable(&catalog, skill_id, &selection, 1, "warrior"));
            let next = toggle(&catalog, skill_id, &selection, 1, "warrior");
            assert_eq!(next.len(), 2);
            assert!(!next.contains(skill_id));
        }
    }

    #[test]
    fn test_toggle_adds_or_leaves_unchanged() {
        let catalog = GameCatalog::builtin();
        let added = toggle(&catalog, "archery", &[], 1, "scout");
        assert_eq!(added, ids(&["archery"]));

        let unchanged = toggle(&catalog, "investigation", &added, 1, "scout");
        assert_eq!(unchanged, added);
    }

    #[test]
    fn test_available_skills() {
        let catalog = GameCatalog::builtin();
        let scout: Vec<&str> = available_skills(&catalog, SkillTier::Basic, "scout")
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(scout, vec!["archery", "stealth", "investigation"]);

        let mystic_master: Vec<&str> = available_skills(&catalog, SkillTier::Master, "mystic")
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(mystic_master, vec!["divine-avatar"]);
    }

    #[test]
    fn test_validate_selection_collects_every_violation() {
        let catalog = GameCatalog::builtin();
        // Level 1 warrior: two basic (cap 1), one advanced (cap 0).
        let selection = ids(&["combat-mastery", "stealth", "shield-wall"]);
        let report = validate_selection(&catalog, &selection, 1, "warrior");
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.code() == "TIER_CAP_EXCEEDED"));
        assert_eq!(report.tiers[0].selected, 2);
        assert_eq!(report.tiers[0].cap, 1);
    }

    #[test]
    fn test_validate_selection_per_skill_problems() {
        let catalog = GameCatalog::builtin();
        let selection = ids(&["archery", "fireball", "healing", "healing"]);
        let report = validate_selection(&catalog, &selection, 3, "mystic");
        assert_eq!(
            report.violations,
            vec![
                RuleViolation::RoleIneligible {
                    skill_id: "archery".to_string(),
                    role: "mystic".to_string()
                },
                RuleViolation::UnknownSkill {
                    skill_id: "fireball".to_string()
                },
                RuleViolation::DuplicateSkill {
                    skill_id: "healing".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_validate_selection_valid() {
        let catalog = GameCatalog::builtin();
        let selection = ids(&["healing", "ritual-magic", "nature-bond", "divine-avatar"]);
        let report = validate_selection(&catalog, &selection, 6, "mystic");
        assert!(report.valid, "{:?}", report.violations);
    }
}
