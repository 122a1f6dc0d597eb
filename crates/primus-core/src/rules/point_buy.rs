//! Point-buy cost and budget checks for ability scores.

use primus_types::character::{Ability, AbilityScores};
use primus_types::config::RulesConfig;
use primus_types::rules::{PointBuySchedule, PointBuySummary, RuleViolation};

/// Lowest score the stepped schedule prices.
pub const STEPPED_MIN: u8 = 8;
/// Highest score the stepped schedule prices.
pub const STEPPED_MAX: u8 = 15;

/// Cost of a single score under the stepped schedule.
///
/// Scores outside `[8, 15]` are clamped first, so this never fails.
///
/// ```
/// use primus_core::rules::point_buy::stepped_cost;
/// assert_eq!(stepped_cost(8), 0);
/// assert_eq!(stepped_cost(13), 5);
/// assert_eq!(stepped_cost(14), 7);
/// assert_eq!(stepped_cost(15), 9);
/// ```
pub fn stepped_cost(score: u8) -> u32 {
    match score.clamp(STEPPED_MIN, STEPPED_MAX) {
        14 => 7,
        15 => 9,
        s => u32::from(s - STEPPED_MIN),
    }
}

/// Budget, cost schedule, and legal score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBuy {
    pub budget: u32,
    pub schedule: PointBuySchedule,
    pub floor: u8,
    pub ceiling: u8,
}

impl Default for PointBuy {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

impl PointBuy {
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            budget: config.budget,
            schedule: config.schedule,
            floor: config.score_floor,
            ceiling: config.score_ceiling,
        }
    }

    /// Cost of one score under this schedule.
    pub fn score_cost(&self, score: u8) -> u32 {
        match self.schedule {
            PointBuySchedule::Stepped => stepped_cost(score),
            PointBuySchedule::Linear => u32::from(score),
        }
    }

    /// Total cost of all six scores.
    pub fn compute_cost(&self, scores: &AbilityScores) -> u32 {
        scores.iter().map(|(_, s)| self.score_cost(s)).sum()
    }

    pub fn is_within_budget(&self, scores: &AbilityScores) -> bool {
        self.compute_cost(scores) <= self.budget
    }

    /// Whether raising `ability` by one keeps the total within budget.
    pub fn can_increase(&self, scores: &AbilityScores, ability: Ability) -> bool {
        let current = scores.get(ability);
        if current >= self.ceiling {
            return false;
        }
        let raised = scores.with(ability, current + 1);
        self.is_within_budget(&raised)
    }

    /// Decreases are never blocked by the budget, only by the floor.
    pub fn can_decrease(&self, scores: &AbilityScores, ability: Ability) -> bool {
        scores.get(ability) > self.floor
    }

    /// Set `ability` to `value` if it stays in range and within budget.
    ///
    /// Lowering a score is accepted whenever it stays at or above the floor.
    pub fn try_set(&self, scores: &AbilityScores, ability: Ability, value: u8) -> Option<AbilityScores> {
        if value < self.floor || value > self.ceiling {
            return None;
        }
        let next = scores.with(ability, value);
        if value <= scores.get(ability) || self.is_within_budget(&next) {
            Some(next)
        } else {
            None
        }
    }

    /// Clamp every score into `[floor, ceiling]`.
    pub fn clamp(&self, scores: &AbilityScores) -> AbilityScores {
        let mut clamped = *scores;
        for ability in Ability::ALL {
            clamped.set(ability, scores.get(ability).clamp(self.floor, self.ceiling));
        }
        clamped
    }

    /// "X / Y points used". `remaining` goes negative when over budget.
    pub fn summary(&self, scores: &AbilityScores) -> PointBuySummary {
        let spent = self.compute_cost(scores);
        PointBuySummary {
            spent,
            budget: self.budget,
            remaining: i64::from(self.budget) - i64::from(spent),
        }
    }

    /// One violation per score outside `[floor, ceiling]`.
    pub fn check_range(&self, scores: &AbilityScores) -> Vec<RuleViolation> {
        scores
            .iter()
            .filter(|&(_, score)| score < self.floor || score > self.ceiling)
            .map(|(ability, score)| RuleViolation::RangeViolation {
                ability,
                score,
                floor: self.floor,
                ceiling: self.ceiling,
            })
            .collect()
    }

    /// Range violations, or a budget violation once every score is in range.
    ///
    /// Cost is only meaningful for in-range scores, so an out-of-range array
    /// never reports `BudgetExceeded`.
    pub fn validate(&self, scores: &AbilityScores) -> Vec<RuleViolation> {
        let violations = self.check_range(scores);
        if !violations.is_empty() {
            return violations;
        }
        let spent = self.compute_cost(scores);
        if spent > self.budget {
            return vec![RuleViolation::BudgetExceeded {
                spent,
                budget: self.budget,
            }];
        }
        Vec::new()
    }
}
