//! Defense bonuses bought with skill points.

use crate::ability::{Abilities, Ability};
use crate::error::SheetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Skill points per +1 defense bonus.
pub const DEFENSE_POINT_COST: u32 = 2;

/// Base of every defense score.
pub const DEFENSE_BASE: i32 = 10;

/// The six defenses, each tied to one ability.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defense {
    Might,
    Fortitude,
    Reflex,
    Discernment,
    MentalFortitude,
    Resolve,
}

impl Defense {
    pub const ALL: [Defense; 6] = [
        Defense::Might,
        Defense::Fortitude,
        Defense::Reflex,
        Defense::Discernment,
        Defense::MentalFortitude,
        Defense::Resolve,
    ];

    /// The ability whose score feeds this defense.
    pub fn ability(self) -> Ability {
        match self {
            Defense::Might => Ability::Strength,
            Defense::Fortitude => Ability::Vitality,
            Defense::Reflex => Ability::Agility,
            Defense::Discernment => Ability::Acuity,
            Defense::MentalFortitude => Ability::Intelligence,
            Defense::Resolve => Ability::Charisma,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Defense::Might => "Might",
            Defense::Fortitude => "Fortitude",
            Defense::Reflex => "Reflex",
            Defense::Discernment => "Discernment",
            Defense::MentalFortitude => "Mental Fortitude",
            Defense::Resolve => "Resolve",
        }
    }
}

impl fmt::Display for Defense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Skill-point-funded bonus per defense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseSkills {
    pub might: u32,
    pub fortitude: u32,
    pub reflex: u32,
    pub discernment: u32,
    pub mental_fortitude: u32,
    pub resolve: u32,
}

impl DefenseSkills {
    pub fn get(&self, defense: Defense) -> u32 {
        match defense {
            Defense::Might => self.might,
            Defense::Fortitude => self.fortitude,
            Defense::Reflex => self.reflex,
            Defense::Discernment => self.discernment,
            Defense::MentalFortitude => self.mental_fortitude,
            Defense::Resolve => self.resolve,
        }
    }

    pub fn set(&mut self, defense: Defense, value: u32) {
        let slot = match defense {
            Defense::Might => &mut self.might,
            Defense::Fortitude => &mut self.fortitude,
            Defense::Reflex => &mut self.reflex,
            Defense::Discernment => &mut self.discernment,
            Defense::MentalFortitude => &mut self.mental_fortitude,
            Defense::Resolve => &mut self.resolve,
        };
        *slot = value;
    }

    pub fn total(&self) -> u32 {
        Defense::ALL.into_iter().map(|defense| self.get(defense)).sum()
    }
}

/// Highest bonus a single defense may carry at `level`.
pub fn max_defense_skill(level: u32) -> u32 {
    level
}

/// Raise a defense by one, returning the skill points spent.
///
/// # Examples
///
/// ```rust
/// use charsheet::{Defense, DefenseSkills};
/// use charsheet::defense::increase;
///
/// let mut defenses = DefenseSkills::default();
/// assert_eq!(increase(&mut defenses, Defense::Reflex, 1), Ok(2));
/// assert!(increase(&mut defenses, Defense::Reflex, 1).is_err());
/// ```
pub fn increase(skills: &mut DefenseSkills, defense: Defense, level: u32) -> Result<u32, SheetError> {
    let current = skills.get(defense);
    let cap = max_defense_skill(level);
    if current >= cap {
        return Err(SheetError::DefenseAtCap { cap });
    }
    skills.set(defense, current + 1);
    tracing::trace!(%defense, value = current + 1, "defense increased");
    Ok(DEFENSE_POINT_COST)
}

/// Lower a defense by one, returning the skill points refunded (0 at the floor).
pub fn decrease(skills: &mut DefenseSkills, defense: Defense) -> u32 {
    let current = skills.get(defense);
    if current == 0 {
        return 0;
    }
    skills.set(defense, current - 1);
    DEFENSE_POINT_COST
}

/// Skill points tied up in defense bonuses.
pub fn points_spent(skills: &DefenseSkills) -> i32 {
    (skills.total() * DEFENSE_POINT_COST) as i32
}

/// `10 + linked ability + bonus`.
pub fn defense_score(defense: Defense, abilities: &Abilities, skills: &DefenseSkills) -> i32 {
    DEFENSE_BASE + abilities.get(defense.ability()) + skills.get(defense) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_follows_level() {
        let mut skills = DefenseSkills::default();
        for _ in 0..3 {
            assert_eq!(increase(&mut skills, Defense::Might, 3), Ok(2));
        }
        assert_eq!(
            increase(&mut skills, Defense::Might, 3),
            Err(SheetError::DefenseAtCap { cap: 3 })
        );
        assert_eq!(skills.might, 3);
    }

    #[test]
    fn test_decrease_floor() {
        let mut skills = DefenseSkills::default();
        assert_eq!(decrease(&mut skills, Defense::Resolve), 0);
        assert_eq!(skills.resolve, 0);

        skills.resolve = 2;
        assert_eq!(decrease(&mut skills, Defense::Resolve), 2);
        assert_eq!(skills.resolve, 1);
    }

    #[test]
    fn test_points_spent() {
        let skills = DefenseSkills {
            might: 1,
            reflex: 2,
            ..Default::default()
        };
        assert_eq!(points_spent(&skills), 6);
    }

    #[test]
    fn test_defense_score() {
        let mut abilities = Abilities::default();
        abilities.set(Ability::Agility, 3);
        let skills = DefenseSkills {
            reflex: 2,
            ..Default::default()
        };
        assert_eq!(defense_score(Defense::Reflex, &abilities, &skills), 15);
        assert_eq!(defense_score(Defense::Might, &abilities, &skills), 10);
    }

    #[test]
    fn test_each_defense_links_a_distinct_ability() {
        let mut linked: Vec<Ability> = Defense::ALL.iter().map(|d| d.ability()).collect();
        linked.sort();
        linked.dedup();
        assert_eq!(linked.len(), 6);
    }
}
