//! Derived statistics.
//!
//! Everything here is recomputed from a [`CharacterBuild`] snapshot after
//! each point-buy step. Nothing is cached between calls.
//!
//! ```text
//! [abilities, skills, defenses, archetype, allocation] → DerivedStats
//! ```

use crate::ability::Ability;
use crate::character::{CharacterBuild, ResourcePools};
use crate::defense::{self, Defense};
use crate::rules::Formulas;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base of power potency and evasion.
pub const POTENCY_BASE: i32 = 10;
pub const EVASION_BASE: i32 = 10;
pub const SPEED_BASE: i32 = 6;

/// Which proficiency track an attack uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTrack {
    Martial,
    Power,
}

/// A derived value together with what went into it.
///
/// Each entry in `sources` is `(description, contribution)`, in the order
/// they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub value: i32,
    pub sources: Vec<(String, i32)>,
}

impl Breakdown {
    fn new() -> Self {
        Self {
            value: 0,
            sources: Vec::new(),
        }
    }

    fn add_source(mut self, description: impl Into<String>, contribution: i32) -> Self {
        self.value += contribution;
        self.sources.push((description.into(), contribution));
        self
    }
}

/// Health/energy points to allocate at `level`: `18 + 12 × (level - 1)`.
///
/// # Examples
///
/// ```rust
/// use charsheet::derived::health_energy_pool;
///
/// assert_eq!(health_energy_pool(1), 18);
/// assert_eq!(health_energy_pool(3), 42);
/// ```
pub fn health_energy_pool(level: u32) -> i32 {
    18 + 12 * level.saturating_sub(1) as i32
}

/// Ability value plus the proficiency of the given track.
pub fn attack_bonus(build: &CharacterBuild, ability: Ability, track: AttackTrack) -> i32 {
    let proficiency = match track {
        AttackTrack::Martial => build.archetype.martial_proficiency,
        AttackTrack::Power => build.archetype.power_proficiency,
    };
    build.abilities.get(ability) + proficiency as i32
}

/// `10 + power proficiency + designated power ability`.
pub fn power_potency(build: &CharacterBuild) -> Breakdown {
    let ability = build
        .archetype
        .power_ability
        .map(|ability| build.abilities.get(ability))
        .unwrap_or(0);
    Breakdown::new()
        .add_source("Base", POTENCY_BASE)
        .add_source("Power proficiency", build.archetype.power_proficiency as i32)
        .add_source("Power ability", ability)
}

/// `10 + agility`.
pub fn evasion(build: &CharacterBuild) -> i32 {
    EVASION_BASE + build.abilities.get(Ability::Agility)
}

/// `6 + ⌈agility / 2⌉`.
pub fn speed(build: &CharacterBuild) -> i32 {
    let agility = build.abilities.get(Ability::Agility);
    SPEED_BASE + (agility + 1).div_euclid(2)
}

/// Every derived statistic of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub defenses: BTreeMap<Defense, i32>,
    pub martial_attack: BTreeMap<Ability, i32>,
    pub power_attack: BTreeMap<Ability, i32>,
    pub power_potency: Breakdown,
    /// Health/energy points available at this level.
    pub health_energy_pool: i32,
    /// Unallocated health/energy points; negative when overspent.
    pub health_energy_remaining: i32,
    pub max_health: Breakdown,
    pub max_energy: Breakdown,
    pub evasion: i32,
    pub speed: i32,
}

impl DerivedStats {
    /// Recompute everything from `build`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::{Ability, CharacterBuild, DerivedStats, StandardFormulas};
    ///
    /// let mut build = CharacterBuild::new(1);
    /// build.abilities.set(Ability::Agility, 3);
    /// build.archetype.martial_proficiency = 2;
    ///
    /// let stats = DerivedStats::compute(&build, &StandardFormulas::default());
    /// assert_eq!(stats.martial_attack[&Ability::Agility], 5);
    /// assert_eq!(stats.evasion, 13);
    /// assert_eq!(stats.speed, 8);
    /// ```
    pub fn compute(build: &CharacterBuild, formulas: &dyn Formulas) -> Self {
        let defenses = Defense::ALL
            .into_iter()
            .map(|d| (d, defense::defense_score(d, &build.abilities, &build.defense_skills)))
            .collect();
        let martial_attack = Ability::ALL
            .into_iter()
            .map(|a| (a, attack_bonus(build, a, AttackTrack::Martial)))
            .collect();
        let power_attack = Ability::ALL
            .into_iter()
            .map(|a| (a, attack_bonus(build, a, AttackTrack::Power)))
            .collect();

        let pool = health_energy_pool(build.level);
        let allocation = build.allocation;
        let max_health = Breakdown::new()
            .add_source("Base", formulas.base_health(build))
            .add_source("Allocated", allocation.health_points);
        let max_energy = Breakdown::new()
            .add_source("Base", formulas.base_energy(build))
            .add_source("Allocated", allocation.energy_points);

        let stats = Self {
            defenses,
            martial_attack,
            power_attack,
            power_potency: power_potency(build),
            health_energy_pool: pool,
            health_energy_remaining: pool - allocation.health_points - allocation.energy_points,
            max_health,
            max_energy,
            evasion: evasion(build),
            speed: speed(build),
        };
        tracing::debug!(
            level = build.level,
            max_health = stats.max_health.value,
            max_energy = stats.max_energy.value,
            potency = stats.power_potency.value,
            "derived stats recomputed"
        );
        if stats.health_energy_remaining < 0 {
            tracing::warn!(
                over = -stats.health_energy_remaining,
                "health/energy allocation exceeds pool"
            );
        }
        stats
    }

    /// Write the derived maximums onto `pools`, clamping current values.
    pub fn sync_pools(&self, pools: &mut ResourcePools) {
        pools.health.max = self.max_health.value;
        pools.energy.max = self.max_energy.value;
        pools.health.current = pools.health.current.min(pools.health.max);
        pools.energy.current = pools.energy.current.min(pools.energy.max);
    }
}
