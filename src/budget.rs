//! Point-buy budget summary.
//!
//! Every budget here is soft: overspending shows up as a negative
//! `remaining` value and a warning, never as an error.

use crate::ability;
use crate::character::CharacterBuild;
use crate::defense;
use crate::derived::health_energy_pool;
use crate::feat::{SlotLimits, SlotUsage};
use crate::rules::Formulas;
use crate::skill;
use serde::{Deserialize, Serialize};

/// Spent and available points on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBudget {
    pub total: i32,
    pub spent: i32,
}

impl PointBudget {
    pub fn new(total: i32, spent: i32) -> Self {
        Self { total, spent }
    }

    /// Negative when overspent.
    pub fn remaining(&self) -> i32 {
        self.total - self.spent
    }

    pub fn is_over(&self) -> bool {
        self.remaining() < 0
    }
}

/// Every budget of a build at its current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub abilities: PointBudget,
    /// Skills and defense bonuses share one pool.
    pub skills: PointBudget,
    pub proficiency: PointBudget,
    pub health_energy: PointBudget,
    pub feat_slots: SlotUsage,
}

impl BudgetReport {
    /// Summarize `build` against the level budgets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::budget::BudgetReport;
    /// use charsheet::feat::SlotLimits;
    /// use charsheet::{Ability, CharacterBuild, StandardFormulas};
    ///
    /// let mut build = CharacterBuild::new(1);
    /// build.abilities.set(Ability::Strength, 2);
    ///
    /// let report = BudgetReport::compute(&build, &StandardFormulas::default(), SlotLimits::default());
    /// assert_eq!(report.abilities.remaining(), 5);
    /// assert!(!report.is_over());
    /// ```
    pub fn compute(build: &CharacterBuild, formulas: &dyn Formulas, limits: SlotLimits) -> Self {
        let level = build.level;
        let skill_spent = skill::points_spent(&build.skills) + defense::points_spent(&build.defense_skills);
        let proficiency_total = crate::proficiency::proficiency_total(level) as i32;

        let report = Self {
            abilities: PointBudget::new(
                formulas.ability_points(level),
                ability::points_spent(&build.abilities),
            ),
            skills: PointBudget::new(formulas.skill_points(level), skill_spent),
            proficiency: PointBudget::new(
                proficiency_total,
                proficiency_total - build.archetype.remaining(level),
            ),
            health_energy: PointBudget::new(
                health_energy_pool(level),
                build.allocation.health_points + build.allocation.energy_points,
            ),
            feat_slots: build.feats.slot_usage(limits),
        };

        tracing::debug!(
            level,
            abilities = report.abilities.remaining(),
            skills = report.skills.remaining(),
            proficiency = report.proficiency.remaining(),
            health_energy = report.health_energy.remaining(),
            "budget summary computed"
        );
        for (axis, budget) in report.axes() {
            if budget.is_over() {
                tracing::warn!(axis, over = -budget.remaining(), "budget overspent");
            }
        }
        if report.feat_slots.is_over() {
            tracing::warn!(
                archetype = report.feat_slots.archetype_remaining(),
                character = report.feat_slots.character_remaining(),
                "feat slots overspent"
            );
        }
        report
    }

    fn axes(&self) -> [(&'static str, PointBudget); 4] {
        [
            ("abilities", self.abilities),
            ("skills", self.skills),
            ("proficiency", self.proficiency),
            ("health_energy", self.health_energy),
        ]
    }

    /// True when any axis or feat slot is overspent.
    pub fn is_over(&self) -> bool {
        self.axes().iter().any(|(_, budget)| budget.is_over()) || self.feat_slots.is_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;
    use crate::defense::DefenseSkills;
    use crate::feat::{Feat, FeatCategory};
    use crate::rules::StandardFormulas;
    use crate::skill::Skill;

    fn limits() -> SlotLimits {
        SlotLimits {
            archetype: 1,
            character: 1,
        }
    }

    #[test]
    fn test_fresh_build_is_within_budget() {
        let build = CharacterBuild::new(1);
        let report = BudgetReport::compute(&build, &StandardFormulas::default(), limits());
        assert_eq!(report.abilities, PointBudget::new(7, 0));
        assert_eq!(report.skills, PointBudget::new(5, 0));
        assert_eq!(report.proficiency, PointBudget::new(2, 0));
        assert_eq!(report.health_energy, PointBudget::new(18, 0));
        assert!(!report.is_over());
    }

    #[test]
    fn test_skills_and_defenses_share_pool() {
        let mut build = CharacterBuild::new(1);
        let mut athletics = Skill::base(1, "Athletics", Ability::Strength);
        athletics.proficient = true;
        athletics.value = 1;
        build.skills.push(athletics);
        build.defense_skills = DefenseSkills {
            reflex: 1,
            ..Default::default()
        };
        let report = BudgetReport::compute(&build, &StandardFormulas::default(), limits());
        // proficiency 1 + value 1 + defense 2
        assert_eq!(report.skills.spent, 4);
        assert_eq!(report.skills.remaining(), 1);
    }

    #[test]
    fn test_overspend_reported_not_blocked() {
        let mut build = CharacterBuild::new(1);
        build.abilities.set(Ability::Strength, 4);
        build.abilities.set(Ability::Agility, 4);
        build.allocation.health_points = 20;
        build.feats.add(Feat::new("Tough", FeatCategory::Character)).unwrap();
        build.feats.add(Feat::new("Alert", FeatCategory::Character)).unwrap();

        let report = BudgetReport::compute(&build, &StandardFormulas::default(), limits());
        assert_eq!(report.abilities.remaining(), -1);
        assert_eq!(report.health_energy.remaining(), -2);
        assert_eq!(report.feat_slots.character_remaining(), -1);
        assert!(report.is_over());
    }

    #[test]
    fn test_proficiency_spent_tracks_archetype() {
        let mut build = CharacterBuild::new(5);
        build.archetype.power_proficiency = 2;
        build.archetype.martial_proficiency = 1;
        let report = BudgetReport::compute(&build, &StandardFormulas::default(), limits());
        assert_eq!(report.proficiency, PointBudget::new(3, 3));
    }
}
