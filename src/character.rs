//! The character build snapshot.
//!
//! The host application owns the build. Budget and derivation functions
//! read it; point-buy operations mutate one field at a time.

use crate::ability::Abilities;
use crate::defense::DefenseSkills;
use crate::feat::{FeatLedger, TraitUse};
use crate::proficiency::Archetype;
use crate::skill::Skill;
use serde::{Deserialize, Serialize};

/// Current and maximum of one resource pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub current: i32,
    pub max: i32,
}

impl Pool {
    pub fn new(current: i32, max: i32) -> Self {
        Self { current, max }
    }

    /// Missing amount, never negative.
    pub fn deficit(&self) -> i32 {
        (self.max - self.current).max(0)
    }

    pub fn fill(&mut self) {
        self.current = self.max;
    }
}

/// Health and energy pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePools {
    pub health: Pool,
    pub energy: Pool,
}

/// How the level-derived health/energy point pool has been split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAllocation {
    pub health_points: i32,
    pub energy_points: i32,
}

/// Everything the engine reads about a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBuild {
    pub level: u32,
    pub experience: u32,
    pub abilities: Abilities,
    pub skills: Vec<Skill>,
    pub defense_skills: DefenseSkills,
    pub archetype: Archetype,
    pub feats: FeatLedger,
    pub traits: Vec<TraitUse>,
    pub pools: ResourcePools,
    pub allocation: PoolAllocation,
}

impl Default for CharacterBuild {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CharacterBuild {
    /// An empty build at `level` (at least 1).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.max(1),
            experience: 0,
            abilities: Abilities::default(),
            skills: Vec::new(),
            defense_skills: DefenseSkills::default(),
            archetype: Archetype::default(),
            feats: FeatLedger::new(),
            traits: Vec::new(),
            pools: ResourcePools::default(),
            allocation: PoolAllocation::default(),
        }
    }
}
