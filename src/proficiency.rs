//! Archetype proficiency points.
//!
//! A character's archetype proficiency pool grows with level and is split
//! between a power track and a martial track. Which tracks are in use
//! depends on the archetype kind.

use crate::ability::Ability;
use serde::{Deserialize, Serialize};

/// The archetype kind decides which proficiency tracks are in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchetypeKind {
    #[default]
    Power,
    Martial,
    PoweredMartial,
}

/// Power and martial proficiency after a redistribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencySplit {
    pub power: u32,
    pub martial: u32,
}

impl ProficiencySplit {
    pub fn total(&self) -> u32 {
        self.power + self.martial
    }
}

/// Archetype choices held by a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Archetype {
    pub kind: ArchetypeKind,
    pub power_proficiency: u32,
    pub martial_proficiency: u32,
    /// Ability driving power attacks and power potency.
    pub power_ability: Option<Ability>,
    /// Ability driving martial attacks.
    pub martial_ability: Option<Ability>,
}

/// Total proficiency points at `level`: `2 + level / 5`.
///
/// # Examples
///
/// ```rust
/// use charsheet::proficiency::proficiency_total;
///
/// assert_eq!(proficiency_total(1), 2);
/// assert_eq!(proficiency_total(5), 3);
/// assert_eq!(proficiency_total(25), 7);
/// ```
pub fn proficiency_total(level: u32) -> u32 {
    2 + level / 5
}

/// Split `current_total` (capped at the level total) for a new archetype kind.
///
/// Powered-martial archetypes split evenly, and an odd point goes to martial.
///
/// # Examples
///
/// ```rust
/// use charsheet::ArchetypeKind;
/// use charsheet::proficiency::redistribute;
///
/// let split = redistribute(ArchetypeKind::PoweredMartial, 7, 25);
/// assert_eq!((split.power, split.martial), (3, 4));
///
/// let split = redistribute(ArchetypeKind::Power, 7, 25);
/// assert_eq!((split.power, split.martial), (7, 0));
/// ```
pub fn redistribute(kind: ArchetypeKind, current_total: u32, level: u32) -> ProficiencySplit {
    let total = current_total.min(proficiency_total(level));
    match kind {
        ArchetypeKind::Power => ProficiencySplit {
            power: total,
            martial: 0,
        },
        ArchetypeKind::Martial => ProficiencySplit {
            power: 0,
            martial: total,
        },
        ArchetypeKind::PoweredMartial => ProficiencySplit {
            power: total / 2,
            martial: total / 2 + total % 2,
        },
    }
}

impl Archetype {
    pub fn split(&self) -> ProficiencySplit {
        ProficiencySplit {
            power: self.power_proficiency,
            martial: self.martial_proficiency,
        }
    }

    /// Switch archetype kind and redistribute the current proficiency.
    ///
    /// The ability of a track the new kind no longer uses is cleared unless
    /// `keep_unused_ability` is set.
    pub fn change_kind(&mut self, kind: ArchetypeKind, level: u32, keep_unused_ability: bool) {
        let split = redistribute(kind, self.split().total(), level);
        tracing::debug!(
            from = ?self.kind,
            to = ?kind,
            power = split.power,
            martial = split.martial,
            "archetype kind changed"
        );
        self.kind = kind;
        self.power_proficiency = split.power;
        self.martial_proficiency = split.martial;
        if !keep_unused_ability {
            match kind {
                ArchetypeKind::Power => self.martial_ability = None,
                ArchetypeKind::Martial => self.power_ability = None,
                ArchetypeKind::PoweredMartial => {}
            }
        }
    }

    /// Unspent proficiency at `level`; negative when overspent.
    pub fn remaining(&self, level: u32) -> i32 {
        proficiency_total(level) as i32 - self.split().total() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proficiency_total_steps() {
        assert_eq!(proficiency_total(4), 2);
        assert_eq!(proficiency_total(5), 3);
        assert_eq!(proficiency_total(9), 3);
        assert_eq!(proficiency_total(10), 4);
    }

    #[test]
    fn test_redistribute_caps_at_level_total() {
        let split = redistribute(ArchetypeKind::Martial, 9, 1);
        assert_eq!(split, ProficiencySplit { power: 0, martial: 2 });
    }

    #[test]
    fn test_redistribute_even_split() {
        let split = redistribute(ArchetypeKind::PoweredMartial, 4, 10);
        assert_eq!(split, ProficiencySplit { power: 2, martial: 2 });
    }

    #[test]
    fn test_change_kind_clears_unused_ability() {
        let mut archetype = Archetype {
            kind: ArchetypeKind::PoweredMartial,
            power_proficiency: 1,
            martial_proficiency: 1,
            power_ability: Some(Ability::Intelligence),
            martial_ability: Some(Ability::Strength),
        };
        archetype.change_kind(ArchetypeKind::Power, 1, false);
        assert_eq!(archetype.power_proficiency, 2);
        assert_eq!(archetype.martial_proficiency, 0);
        assert_eq!(archetype.power_ability, Some(Ability::Intelligence));
        assert_eq!(archetype.martial_ability, None);
    }

    #[test]
    fn test_change_kind_keeps_confirmed_ability() {
        let mut archetype = Archetype {
            kind: ArchetypeKind::Power,
            power_proficiency: 2,
            power_ability: Some(Ability::Charisma),
            ..Default::default()
        };
        archetype.change_kind(ArchetypeKind::Martial, 1, true);
        assert_eq!(archetype.martial_proficiency, 2);
        assert_eq!(archetype.power_ability, Some(Ability::Charisma));
    }

    #[test]
    fn test_remaining_goes_negative() {
        let archetype = Archetype {
            power_proficiency: 3,
            martial_proficiency: 1,
            ..Default::default()
        };
        assert_eq!(archetype.remaining(1), -2);
    }
}
