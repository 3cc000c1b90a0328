//! Ability scores and their point-buy pricing.
//!
//! Scores live in `[-2, max_ability(level)]`, and the sum of all negative
//! scores may not drop below -3. Raising a score costs 1 point until the
//! score reaches 4; every step past that costs 2. Lowering a score refunds
//! exactly what the matching increase cost, so an increase followed by a
//! decrease is always point-neutral.

use crate::error::SheetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score any ability may hold.
pub const MIN_ABILITY: i32 = -2;

/// Lowest permitted sum over all negative ability scores.
pub const NEGATIVE_SUM_LIMIT: i32 = -3;

/// Current score from which the next point costs 2.
pub const DOUBLE_COST_THRESHOLD: i32 = 4;

/// The six core abilities.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Strength,
    Vitality,
    Agility,
    Acuity,
    Intelligence,
    Charisma,
}

impl Ability {
    /// Every ability, in sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Vitality,
        Ability::Agility,
        Ability::Acuity,
        Ability::Intelligence,
        Ability::Charisma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Vitality => "Vitality",
            Ability::Agility => "Agility",
            Ability::Acuity => "Acuity",
            Ability::Intelligence => "Intelligence",
            Ability::Charisma => "Charisma",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Ability> {
        Ability::ALL
            .into_iter()
            .find(|ability| ability.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One score per ability.
///
/// # Examples
///
/// ```rust
/// use charsheet::{Abilities, Ability};
///
/// let mut abilities = Abilities::default();
/// abilities.set(Ability::Agility, 3);
/// assert_eq!(abilities.get(Ability::Agility), 3);
/// assert_eq!(abilities.get(Ability::Strength), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Abilities {
    pub strength: i32,
    pub vitality: i32,
    pub agility: i32,
    pub acuity: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl Abilities {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Vitality => self.vitality,
            Ability::Agility => self.agility,
            Ability::Acuity => self.acuity,
            Ability::Intelligence => self.intelligence,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        *self.slot(ability) = value;
    }

    fn slot(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Vitality => &mut self.vitality,
            Ability::Agility => &mut self.agility,
            Ability::Acuity => &mut self.acuity,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Charisma => &mut self.charisma,
        }
    }

    /// Iterate `(ability, score)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(move |ability| (ability, self.get(ability)))
    }

    /// Sum of every negative score (0 when none are negative).
    pub fn negative_sum(&self) -> i32 {
        self.iter().map(|(_, value)| value.min(0)).sum()
    }
}

/// Points needed to raise a score from `current` to `current + 1`.
///
/// # Examples
///
/// ```rust
/// use charsheet::ability::increase_cost;
///
/// assert_eq!(increase_cost(3), 1);
/// assert_eq!(increase_cost(4), 2);
/// ```
pub fn increase_cost(current: i32) -> u32 {
    if current < DOUBLE_COST_THRESHOLD {
        1
    } else {
        2
    }
}

/// Points returned when lowering a score from `current` to `current - 1`.
pub fn decrease_refund(current: i32) -> u32 {
    if current > DOUBLE_COST_THRESHOLD {
        2
    } else {
        1
    }
}

/// Highest score an ability may reach at `level`.
///
/// # Examples
///
/// ```rust
/// use charsheet::ability::max_ability;
///
/// assert_eq!(max_ability(1), 3);
/// assert_eq!(max_ability(4), 5);
/// assert_eq!(max_ability(16), 9);
/// ```
pub fn max_ability(level: u32) -> i32 {
    match level {
        0..=1 => 3,
        2..=3 => 4,
        4..=6 => 5,
        7..=9 => 6,
        10..=12 => 7,
        13..=15 => 8,
        _ => 9,
    }
}

pub fn can_increase(value: i32, level: u32) -> bool {
    value < max_ability(level)
}

/// Outcome of a hypothetical one-point decrease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseCheck {
    pub allowed: bool,
    /// Points returned if the decrease goes ahead (0 when denied).
    pub refund: u32,
    /// Why the decrease was denied.
    pub reason: Option<String>,
}

/// Check whether `ability` can be lowered by one point.
///
/// Denied when the new score would fall below [`MIN_ABILITY`], or when it
/// would be negative and the sum of all negative scores after the change
/// would fall below [`NEGATIVE_SUM_LIMIT`].
///
/// # Examples
///
/// ```rust
/// use charsheet::{Abilities, Ability};
/// use charsheet::ability::can_decrease;
///
/// let mut abilities = Abilities::default();
/// abilities.set(Ability::Strength, -2);
/// abilities.set(Ability::Agility, -1);
///
/// let check = can_decrease(&abilities, Ability::Charisma);
/// assert!(!check.allowed);
/// assert_eq!(check.reason.as_deref(), Some("Negative sum cannot exceed -3"));
/// ```
pub fn can_decrease(abilities: &Abilities, ability: Ability) -> DecreaseCheck {
    match check_decrease(abilities, ability) {
        Ok(refund) => DecreaseCheck {
            allowed: true,
            refund,
            reason: None,
        },
        Err(err) => DecreaseCheck {
            allowed: false,
            refund: 0,
            reason: Some(err.reason()),
        },
    }
}

fn check_decrease(abilities: &Abilities, ability: Ability) -> Result<u32, SheetError> {
    let current = abilities.get(ability);
    let next = current - 1;
    if next < MIN_ABILITY {
        return Err(SheetError::BelowMinimum {
            minimum: MIN_ABILITY,
        });
    }
    if next < 0 {
        let mut hypothetical = *abilities;
        hypothetical.set(ability, next);
        if hypothetical.negative_sum() < NEGATIVE_SUM_LIMIT {
            return Err(SheetError::NegativeSumExceeded {
                limit: NEGATIVE_SUM_LIMIT,
            });
        }
    }
    Ok(decrease_refund(current))
}

/// Raise `ability` by one point, returning the points spent.
pub fn increase(abilities: &mut Abilities, ability: Ability, level: u32) -> Result<u32, SheetError> {
    let current = abilities.get(ability);
    if !can_increase(current, level) {
        return Err(SheetError::AboveMaximum {
            maximum: max_ability(level),
            level,
        });
    }
    let cost = increase_cost(current);
    abilities.set(ability, current + 1);
    tracing::trace!(%ability, from = current, cost, "ability increased");
    Ok(cost)
}

/// Lower `ability` by one point, returning the points refunded.
pub fn decrease(abilities: &mut Abilities, ability: Ability) -> Result<u32, SheetError> {
    let refund = check_decrease(abilities, ability)?;
    let current = abilities.get(ability);
    abilities.set(ability, current - 1);
    tracing::trace!(%ability, from = current, refund, "ability decreased");
    Ok(refund)
}

/// Total points a single score costs when bought up from 0.
///
/// Negative scores give back one point per step below 0.
pub fn score_cost(value: i32) -> i32 {
    if value <= 0 {
        value
    } else {
        let cheap = value.min(DOUBLE_COST_THRESHOLD);
        let dear = (value - DOUBLE_COST_THRESHOLD).max(0);
        cheap + 2 * dear
    }
}

/// Total points spent across all six abilities.
pub fn points_spent(abilities: &Abilities) -> i32 {
    abilities.iter().map(|(_, value)| score_cost(value)).sum()
}

/// Check every hard bound on a full ability set.
pub fn validate(abilities: &Abilities, level: u32) -> Result<(), SheetError> {
    let maximum = max_ability(level);
    for (_, value) in abilities.iter() {
        if value < MIN_ABILITY {
            return Err(SheetError::BelowMinimum {
                minimum: MIN_ABILITY,
            });
        }
        if value > maximum {
            return Err(SheetError::AboveMaximum { maximum, level });
        }
    }
    if abilities.negative_sum() < NEGATIVE_SUM_LIMIT {
        return Err(SheetError::NegativeSumExceeded {
            limit: NEGATIVE_SUM_LIMIT,
        });
    }
    Ok(())
}
