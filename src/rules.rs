//! Rules configuration and the formulas collaborator.
//!
//! The engine composes point-buy pricing and allocation on top of a small
//! set of base formulas (base health, base energy, point pools per level).
//! Those formulas are owned by the host application; the [`Formulas`] trait
//! is the seam, and [`StandardFormulas`] is a ready-made implementation
//! driven by a serde-loadable [`RulesConfig`].

use crate::character::CharacterBuild;
use crate::error::SheetError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric constants for the standard formulas.
///
/// Every field has a default, so a partial JSON document only overrides
/// what it names.
///
/// # Examples
///
/// ```rust
/// use charsheet::RulesConfig;
///
/// let rules = RulesConfig::from_json_str(r#"{ "base_health": 10 }"#).unwrap();
/// assert_eq!(rules.base_health, 10);
/// assert_eq!(rules.ability_points_base, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Ability points available at level 1.
    pub ability_points_base: i32,
    /// One extra ability point every this many levels.
    pub ability_points_level_step: u32,
    /// Skill points before per-level gains.
    pub skill_points_base: i32,
    /// Skill points gained per level.
    pub skill_points_per_level: i32,
    /// Health before the vitality score and point allocation.
    pub base_health: i32,
    /// Energy before the archetype ability and point allocation.
    pub base_energy: i32,
    /// Creature training points at level 1.
    pub training_points_base: i32,
    /// Creature training points gained per level after the first.
    pub training_points_per_level: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            ability_points_base: 7,
            ability_points_level_step: 3,
            skill_points_base: 2,
            skill_points_per_level: 3,
            base_health: 8,
            base_energy: 0,
            training_points_base: 22,
            training_points_per_level: 2,
        }
    }
}

impl RulesConfig {
    /// Parse rules from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SheetError> {
        let rules: RulesConfig = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Read and parse rules from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), SheetError> {
        if self.ability_points_level_step == 0 {
            return Err(SheetError::Config(
                "ability_points_level_step must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Base formulas consumed, but not owned, by the engine.
///
/// Implementations must be pure: the same inputs always produce the same
/// outputs, since derived values are recomputed after every point-buy step.
pub trait Formulas {
    /// Health before the player's point allocation is added.
    fn base_health(&self, build: &CharacterBuild) -> i32;

    /// Energy before the player's point allocation is added.
    fn base_energy(&self, build: &CharacterBuild) -> i32;

    /// Ability points available at `level`.
    fn ability_points(&self, level: u32) -> i32;

    /// Skill points available at `level` (shared with defense bonuses).
    fn skill_points(&self, level: u32) -> i32;

    /// Creature training points available at `level`.
    fn training_points(&self, level: u32) -> i32;
}

/// [`Formulas`] backed by a [`RulesConfig`].
///
/// - base health = `base_health` + vitality
/// - base energy = `base_energy` + the higher of the archetype's power and
///   martial ability scores (0 when neither is designated)
/// - ability points = `ability_points_base` + level / `ability_points_level_step`
/// - skill points = `skill_points_base` + `skill_points_per_level` × level
/// - training points = `training_points_base` + `training_points_per_level` × (level - 1)
#[derive(Debug, Clone, Default)]
pub struct StandardFormulas {
    rules: RulesConfig,
}

impl StandardFormulas {
    pub fn new(rules: RulesConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }
}

impl Formulas for StandardFormulas {
    fn base_health(&self, build: &CharacterBuild) -> i32 {
        self.rules.base_health + build.abilities.get(crate::Ability::Vitality)
    }

    fn base_energy(&self, build: &CharacterBuild) -> i32 {
        let archetype = &build.archetype;
        let best = [archetype.power_ability, archetype.martial_ability]
            .into_iter()
            .flatten()
            .map(|ability| build.abilities.get(ability))
            .max()
            .unwrap_or(0);
        self.rules.base_energy + best
    }

    fn ability_points(&self, level: u32) -> i32 {
        let step = self.rules.ability_points_level_step.max(1);
        self.rules.ability_points_base + (level / step) as i32
    }

    fn skill_points(&self, level: u32) -> i32 {
        self.rules.skill_points_base + self.rules.skill_points_per_level * level as i32
    }

    fn training_points(&self, level: u32) -> i32 {
        self.rules.training_points_base
            + self.rules.training_points_per_level * level.saturating_sub(1) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ability, ArchetypeKind, CharacterBuild};

    #[test]
    fn test_partial_json_keeps_defaults() {
        let rules = RulesConfig::from_json_str(r#"{ "skill_points_base": 4 }"#).unwrap();
        assert_eq!(rules.skill_points_base, 4);
        assert_eq!(rules.skill_points_per_level, 3);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = RulesConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SheetError::Config(_)));
    }

    #[test]
    fn test_zero_level_step_rejected() {
        let err = RulesConfig::from_json_str(r#"{ "ability_points_level_step": 0 }"#).unwrap_err();
        assert!(matches!(err, SheetError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RulesConfig::from_json_file("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, SheetError::Config(_)));
    }

    #[test]
    fn test_standard_point_pools() {
        let formulas = StandardFormulas::default();
        assert_eq!(formulas.ability_points(1), 7);
        assert_eq!(formulas.ability_points(3), 8);
        assert_eq!(formulas.skill_points(1), 5);
        assert_eq!(formulas.training_points(1), 22);
        assert_eq!(formulas.training_points(5), 30);
    }

    #[test]
    fn test_base_energy_uses_best_archetype_ability() {
        let mut build = CharacterBuild::new(1);
        build.abilities.set(Ability::Strength, 3);
        build.abilities.set(Ability::Charisma, 1);
        build.archetype.kind = ArchetypeKind::PoweredMartial;
        build.archetype.power_ability = Some(Ability::Charisma);
        build.archetype.martial_ability = Some(Ability::Strength);

        let formulas = StandardFormulas::default();
        assert_eq!(formulas.base_energy(&build), 3);

        build.archetype.martial_ability = None;
        assert_eq!(formulas.base_energy(&build), 1);

        build.archetype.power_ability = None;
        assert_eq!(formulas.base_energy(&build), 0);
    }

    #[test]
    fn test_base_health_adds_vitality() {
        let mut build = CharacterBuild::new(1);
        build.abilities.set(Ability::Vitality, -1);
        assert_eq!(StandardFormulas::default().base_health(&build), 7);
    }
}
