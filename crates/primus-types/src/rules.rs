//! Rule-engine result types.
//!
//! The progression rules never fail on expected input problems. They return a
//! [`ValidationReport`] enumerating zero or more [`RuleViolation`]s and the
//! caller decides whether to reject a save or merely warn.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SkillTier;
use crate::character::Ability;

/// A single rule broken by a character draft.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleViolation {
    #[error("{ability} score {score} is outside the allowed range [{floor}, {ceiling}]")]
    RangeViolation {
        ability: Ability,
        score: u8,
        floor: u8,
        ceiling: u8,
    },

    #[error("point-buy cost {spent} exceeds the budget of {budget} points")]
    BudgetExceeded { spent: u32, budget: u32 },

    #[error("{selected} {tier} skills selected but level allows {cap}")]
    TierCapExceeded {
        tier: SkillTier,
        selected: usize,
        cap: u32,
    },

    #[error("skill '{skill_id}' is not available to role '{role}'")]
    RoleIneligible { skill_id: String, role: String },

    #[error("unknown skill '{skill_id}'")]
    UnknownSkill { skill_id: String },

    #[error("skill '{skill_id}' is selected more than once")]
    DuplicateSkill { skill_id: String },

    #[error("unknown role '{role}'")]
    UnknownRole { role: String },

    #[error("unknown archetype '{archetype}'")]
    UnknownArchetype { archetype: String },

    #[error("archetype '{archetype}' belongs to role '{archetype_role}', not '{role}'")]
    ArchetypeRoleMismatch {
        archetype: String,
        archetype_role: String,
        role: String,
    },

    #[error("level {level} is outside the allowed range [{min}, {max}]")]
    LevelOutOfRange { level: u32, min: u32, max: u32 },

    #[error("invalid name: {reason}")]
    InvalidName { reason: String },
}

impl RuleViolation {
    /// Machine-readable code, matching the serialized `code` tag.
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::RangeViolation { .. } => "RANGE_VIOLATION",
            RuleViolation::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            RuleViolation::TierCapExceeded { .. } => "TIER_CAP_EXCEEDED",
            RuleViolation::RoleIneligible { .. } => "ROLE_INELIGIBLE",
            RuleViolation::UnknownSkill { .. } => "UNKNOWN_SKILL",
            RuleViolation::DuplicateSkill { .. } => "DUPLICATE_SKILL",
            RuleViolation::UnknownRole { .. } => "UNKNOWN_ROLE",
            RuleViolation::UnknownArchetype { .. } => "UNKNOWN_ARCHETYPE",
            RuleViolation::ArchetypeRoleMismatch { .. } => "ARCHETYPE_ROLE_MISMATCH",
            RuleViolation::LevelOutOfRange { .. } => "LEVEL_OUT_OF_RANGE",
            RuleViolation::InvalidName { .. } => "INVALID_NAME",
        }
    }

    /// Draft field the violation refers to (`stats.wisdom`, `skills`, ...).
    pub fn field(&self) -> String {
        match self {
            RuleViolation::RangeViolation { ability, .. } => format!("stats.{ability}"),
            RuleViolation::BudgetExceeded { .. } => "stats".to_string(),
            RuleViolation::TierCapExceeded { .. }
            | RuleViolation::RoleIneligible { .. }
            | RuleViolation::UnknownSkill { .. }
            | RuleViolation::DuplicateSkill { .. } => "skills".to_string(),
            RuleViolation::UnknownRole { .. } => "role".to_string(),
            RuleViolation::UnknownArchetype { .. } | RuleViolation::ArchetypeRoleMismatch { .. } => {
                "archetype".to_string()
            }
            RuleViolation::LevelOutOfRange { .. } => "level".to_string(),
            RuleViolation::InvalidName { .. } => "name".to_string(),
        }
    }
}

/// How a score maps to its point-buy cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointBuySchedule {
    /// 8-13 cost one point per step above 8; 14 costs 7, 15 costs 9.
    #[default]
    Stepped,
    /// Every score costs its own value (flat sum-of-six cap).
    Linear,
}

impl fmt::Display for PointBuySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointBuySchedule::Stepped => write!(f, "stepped"),
            PointBuySchedule::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for PointBuySchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stepped" => Ok(PointBuySchedule::Stepped),
            "linear" => Ok(PointBuySchedule::Linear),
            other => Err(format!("invalid point-buy schedule: '{other}'")),
        }
    }
}

/// What the character service does with a draft that has violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    /// Refuse to persist.
    #[default]
    Reject,
    /// Persist anyway and log the violations.
    Warn,
}

/// "X / Y points used".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBuySummary {
    pub spent: u32,
    pub budget: u32,
    /// Negative when over budget.
    pub remaining: i64,
}

/// Selected count against cap for one skill tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierUsage {
    pub tier: SkillTier,
    pub selected: usize,
    pub cap: u32,
}

/// Outcome of skill-selection validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub valid: bool,
    pub violations: Vec<RuleViolation>,
    pub tiers: Vec<TierUsage>,
}

/// Outcome of validating a whole character draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<RuleViolation>,
    pub point_buy: PointBuySummary,
    pub tiers: Vec<TierUsage>,
}

impl ValidationReport {
    /// One-line human summary of every violation.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
