//! Character progression rules.
//!
//! [`ProgressionRules`] is the single validation entry point. It combines the
//! point-buy budget ([`point_buy`]), the level-gated skill tiers ([`skills`]),
//! and the identity checks on name, level, role, and archetype into one
//! [`ValidationReport`]. Validation never fails on bad input; every broken
//! rule is reported and the caller decides what to do.

pub mod point_buy;
pub mod skills;

use std::sync::Arc;

use primus_types::character::CharacterDraft;
use primus_types::config::RulesConfig;
use primus_types::error::ConfigError;
use primus_types::rules::{RuleViolation, ValidationReport};

use crate::catalog::GameCatalog;

use self::point_buy::PointBuy;

/// Longest accepted character name, in characters, after trimming.
pub const MAX_NAME_LEN: usize = 100;

/// Stateless, shareable rule engine.
#[derive(Debug, Clone)]
pub struct ProgressionRules {
    point_buy: PointBuy,
    min_level: u32,
    max_level: u32,
    catalog: Arc<GameCatalog>,
}

impl ProgressionRules {
    pub fn new(config: &RulesConfig, catalog: Arc<GameCatalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            point_buy: PointBuy::from_config(config),
            min_level: config.min_level,
            max_level: config.max_level,
            catalog,
        })
    }

    pub fn point_buy(&self) -> &PointBuy {
        &self.point_buy
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn level_range(&self) -> (u32, u32) {
        (self.min_level, self.max_level)
    }

    /// Validate a draft against every rule, in a fixed order.
    pub fn validate(&self, draft: &CharacterDraft) -> ValidationReport {
        let mut violations = Vec::new();

        if let Some(reason) = name_problem(&draft.name) {
            violations.push(RuleViolation::InvalidName { reason });
        }

        if draft.level < self.min_level || draft.level > self.max_level {
            violations.push(RuleViolation::LevelOutOfRange {
                level: draft.level,
                min: self.min_level,
                max: self.max_level,
            });
        }

        if self.catalog.role(&draft.role).is_none() {
            violations.push(RuleViolation::UnknownRole {
                role: draft.role.clone(),
            });
        }
        match self.catalog.archetype(&draft.archetype) {
            None => violations.push(RuleViolation::UnknownArchetype {
                archetype: draft.archetype.clone(),
            }),
            Some(archetype) if archetype.role_id != draft.role => {
                violations.push(RuleViolation::ArchetypeRoleMismatch {
                    archetype: archetype.id.clone(),
                    archetype_role: archetype.role_id.clone(),
                    role: draft.role.clone(),
                });
            }
            Some(_) => {}
        }

        violations.extend(self.point_buy.validate(&draft.stats));

        let selection =
            skills::validate_selection(&self.catalog, &draft.skills, draft.level, &draft.role);
        violations.extend(selection.violations);

        ValidationReport {
            valid: violations.is_empty(),
            violations,
            point_buy: self.point_buy.summary(&draft.stats),
            tiers: selection.tiers,
        }
    }
}

fn name_problem(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Some("name cannot be empty".to_string())
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        Some(format!("name cannot exceed {MAX_NAME_LEN} characters"))
    } else {
        None
    }
}
