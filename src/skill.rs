//! Skill and sub-skill point-buy rules.
//!
//! Base skills cost one point for proficiency plus their value. Sub-skills
//! hang off a parent base skill (or off any proficient base skill) and can
//! only be proficient while that parent is. Values are unbounded; spending
//! past the skill-point pool is reported by the budget, never blocked here.

use crate::ability::{Abilities, Ability};
use crate::error::SheetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier for a skill.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a skill sits in the skill tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SkillParent {
    /// A base skill.
    Base,
    /// A sub-skill that accepts any proficient base skill as its parent.
    AnyBase,
    /// A sub-skill of one specific base skill.
    Specific(SkillId),
}

/// A skill as held by a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub ability: Ability,
    #[serde(default)]
    pub proficient: bool,
    #[serde(default)]
    pub value: u32,
    #[serde(default = "base_parent")]
    pub parent: SkillParent,
    /// Proficiency supplied for free by species or ancestry.
    #[serde(default)]
    pub granted: bool,
}

fn base_parent() -> SkillParent {
    SkillParent::Base
}

impl Skill {
    /// A non-proficient base skill.
    pub fn base(id: u32, name: impl Into<String>, ability: Ability) -> Self {
        Self {
            id: SkillId(id),
            name: name.into(),
            ability,
            proficient: false,
            value: 0,
            parent: SkillParent::Base,
            granted: false,
        }
    }

    /// A non-proficient sub-skill.
    pub fn sub(id: u32, name: impl Into<String>, ability: Ability, parent: SkillParent) -> Self {
        Self {
            parent,
            ..Self::base(id, name, ability)
        }
    }

    /// Mark the skill as a free species/ancestry proficiency.
    pub fn granted(mut self) -> Self {
        self.granted = true;
        self.proficient = true;
        self
    }

    pub fn is_sub_skill(&self) -> bool {
        self.parent != SkillParent::Base
    }

    fn clear(&mut self) {
        self.proficient = false;
        self.value = 0;
    }
}

fn index_of(skills: &[Skill], id: SkillId) -> Result<usize, SheetError> {
    skills
        .iter()
        .position(|skill| skill.id == id)
        .ok_or_else(|| SheetError::UnknownSkill(id.to_string()))
}

/// Whether `skill` currently has a proficient parent.
///
/// Base skills are always their own parent and return `true`.
pub fn parent_is_proficient(skills: &[Skill], skill: &Skill) -> bool {
    match skill.parent {
        SkillParent::Base => true,
        SkillParent::AnyBase => skills
            .iter()
            .any(|other| !other.is_sub_skill() && other.proficient),
        SkillParent::Specific(parent_id) => skills
            .iter()
            .any(|other| other.id == parent_id && !other.is_sub_skill() && other.proficient),
    }
}

/// Clear any proficient sub-skill that lost its last valid parent.
fn drop_orphaned_sub_skills(skills: &mut [Skill]) {
    let orphaned: Vec<usize> = skills
        .iter()
        .enumerate()
        .filter(|(_, skill)| skill.is_sub_skill() && skill.proficient)
        .filter(|(_, skill)| !parent_is_proficient(skills, skill))
        .map(|(idx, _)| idx)
        .collect();
    for idx in orphaned {
        tracing::trace!(skill = %skills[idx].name, "sub-skill lost its parent");
        skills[idx].clear();
    }
}

/// Flip proficiency on a skill, returning the new proficiency state.
///
/// Turning a base skill on leaves its value at 0. Turning any skill off
/// zeroes its value in the same step, and sub-skills left without a
/// proficient parent are cleared too. A sub-skill turned on starts at
/// value 1 and requires a proficient parent.
pub fn toggle_proficiency(skills: &mut [Skill], id: SkillId) -> Result<bool, SheetError> {
    let idx = index_of(skills, id)?;
    if skills[idx].proficient {
        skills[idx].clear();
        drop_orphaned_sub_skills(skills);
        return Ok(false);
    }
    if skills[idx].is_sub_skill() {
        grant_sub_skill(skills, idx)?;
    } else {
        skills[idx].proficient = true;
        skills[idx].value = 0;
    }
    Ok(true)
}

fn grant_sub_skill(skills: &mut [Skill], idx: usize) -> Result<(), SheetError> {
    if !parent_is_proficient(skills, &skills[idx]) {
        return Err(SheetError::ParentNotProficient {
            skill: skills[idx].name.clone(),
        });
    }
    skills[idx].proficient = true;
    skills[idx].value = 1;
    Ok(())
}

/// Spend one step on a skill.
///
/// # Examples
///
/// ```rust
/// use charsheet::{Ability, Skill, SkillId, SkillParent};
/// use charsheet::skill::increase;
///
/// let mut skills = vec![
///     Skill::base(1, "Athletics", Ability::Strength),
///     Skill::sub(2, "Climbing", Ability::Strength, SkillParent::Specific(SkillId(1))),
/// ];
///
/// // The parent is not proficient yet.
/// assert!(increase(&mut skills, SkillId(2)).is_err());
///
/// increase(&mut skills, SkillId(1)).unwrap();
/// assert!(skills[0].proficient);
/// assert_eq!(skills[0].value, 0);
///
/// increase(&mut skills, SkillId(2)).unwrap();
/// assert_eq!(skills[1].value, 1);
/// ```
pub fn increase(skills: &mut [Skill], id: SkillId) -> Result<(), SheetError> {
    let idx = index_of(skills, id)?;
    let skill = &skills[idx];
    match (skill.is_sub_skill(), skill.proficient) {
        (false, false) => {
            skills[idx].proficient = true;
            skills[idx].value = 0;
        }
        (true, false) => grant_sub_skill(skills, idx)?,
        (_, true) => skills[idx].value += 1,
    }
    tracing::trace!(skill = %skills[idx].name, value = skills[idx].value, "skill increased");
    Ok(())
}

/// Take one step back on a skill.
///
/// A proficient sub-skill at value 1 or less loses its proficiency. A base
/// skill at value 0 loses its proficiency, taking orphaned sub-skills with
/// it. Non-proficient skills are left as they are.
pub fn decrease(skills: &mut [Skill], id: SkillId) -> Result<(), SheetError> {
    let idx = index_of(skills, id)?;
    let skill = &skills[idx];
    if !skill.proficient {
        return Ok(());
    }
    if skill.is_sub_skill() {
        if skill.value <= 1 {
            skills[idx].clear();
        } else {
            skills[idx].value -= 1;
        }
    } else if skill.value == 0 {
        skills[idx].clear();
        drop_orphaned_sub_skills(skills);
    } else {
        skills[idx].value -= 1;
    }
    tracing::trace!(skill = %skills[idx].name, value = skills[idx].value, "skill decreased");
    Ok(())
}

/// Skill points spent: every value, plus one per paid base proficiency.
pub fn points_spent(skills: &[Skill]) -> i32 {
    skills
        .iter()
        .map(|skill| {
            let proficiency = u32::from(skill.proficient && !skill.is_sub_skill() && !skill.granted);
            (skill.value + proficiency) as i32
        })
        .sum()
}

/// The bonus a skill adds to rolls.
///
/// Proficient skills add their value to the linked ability. Without
/// proficiency a positive ability counts for half, rounded up.
pub fn skill_bonus(skill: &Skill, abilities: &Abilities) -> i32 {
    let ability = abilities.get(skill.ability);
    if skill.proficient {
        ability + skill.value as i32
    } else if ability > 0 {
        (ability + 1) / 2
    } else {
        ability
    }
}

/// True when no sub-skill is proficient without a proficient parent.
pub fn parent_invariant_holds(skills: &[Skill]) -> bool {
    skills
        .iter()
        .filter(|skill| skill.is_sub_skill() && skill.proficient)
        .all(|skill| parent_is_proficient(skills, skill))
}
