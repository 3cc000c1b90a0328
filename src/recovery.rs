//! Health and energy recovery.
//!
//! A full recovery tops both pools up and resets everything with a
//! recovery period. A partial recovery lasts 2, 4 or 6 hours; every 2 hours
//! is one quarter, and each quarter restores a quarter of one pool's
//! maximum (rounded up, capped at what the pool is missing). The caller can
//! assign quarters by hand, or let [`optimal_split`] pick the split that
//! restores the largest combined fraction of both pools.

use crate::character::{CharacterBuild, Pool, ResourcePools};
use crate::error::SheetError;
use crate::feat::{FeatLedger, Recoverable, RecoveryPeriod, TraitUse};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Hours in one recovery quarter.
pub const HOURS_PER_QUARTER: u32 = 2;

/// How the quarters of a partial recovery are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterSplit {
    Automatic,
    /// Quarters to health; the rest go to energy.
    Manual { health_quarters: u32 },
}

/// A recovery the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryRequest {
    Full,
    Partial { hours: u32, split: QuarterSplit },
}

/// What a recovery will restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPlan {
    pub kind: RecoveryPeriod,
    pub quarters: u32,
    pub health_quarters: u32,
    pub energy_quarters: u32,
    pub health_per_quarter: i32,
    pub energy_per_quarter: i32,
    pub health_restored: i32,
    pub energy_restored: i32,
}

/// Quarters in a partial recovery of `hours`.
pub fn quarters_for(hours: u32) -> Result<u32, SheetError> {
    match hours {
        2 | 4 | 6 => Ok(hours / HOURS_PER_QUARTER),
        _ => Err(SheetError::InvalidRecoveryDuration { hours }),
    }
}

/// `⌈max / 4⌉`, or 0 for an empty pool.
pub fn per_quarter(max: i32) -> i32 {
    if max <= 0 {
        0
    } else {
        (max + 3) / 4
    }
}

fn restored(pool: &Pool, quarters: u32) -> i32 {
    (per_quarter(pool.max) * quarters as i32).min(pool.deficit())
}

/// Combined restored fraction over the common denominator `max_h × max_e`,
/// each pool's fraction capped at 1.
fn score(health: &Pool, energy: &Pool, health_quarters: u32, energy_quarters: u32) -> i64 {
    let max_h = health.max.max(1) as i64;
    let max_e = energy.max.max(1) as i64;
    let h = (restored(health, health_quarters) as i64).min(max_h);
    let e = (restored(energy, energy_quarters) as i64).min(max_e);
    h * max_e + e * max_h
}

/// Pick `(health_quarters, energy_quarters)` for an automatic recovery.
///
/// Every split is tried. The winner maximizes
/// `min(1, hp/max_hp) + min(1, en/max_en)`; ties go to the most balanced
/// split, then to the one with more health quarters. A pool with nothing
/// missing gets no quarters unless both are full, in which case the
/// quarters are split evenly.
///
/// # Examples
///
/// ```rust
/// use charsheet::Pool;
/// use charsheet::recovery::optimal_split;
///
/// // Only health is missing anything.
/// assert_eq!(optimal_split(2, &Pool::new(10, 20), &Pool::new(20, 20)), (2, 0));
///
/// // Equal deficits: balance wins the tie.
/// assert_eq!(optimal_split(2, &Pool::new(20, 40), &Pool::new(20, 40)), (1, 1));
/// ```
pub fn optimal_split(quarters: u32, health: &Pool, energy: &Pool) -> (u32, u32) {
    match (health.deficit() > 0, energy.deficit() > 0) {
        (false, false) => return (quarters - quarters / 2, quarters / 2),
        (true, false) => return (quarters, 0),
        (false, true) => return (0, quarters),
        (true, true) => {}
    }

    let mut best = (quarters, 0);
    let mut best_score = score(health, energy, quarters, 0);
    for health_quarters in (0..quarters).rev() {
        let energy_quarters = quarters - health_quarters;
        let candidate = score(health, energy, health_quarters, energy_quarters);
        let better = match candidate.cmp(&best_score) {
            Ordering::Greater => true,
            Ordering::Equal => {
                health_quarters.abs_diff(energy_quarters) < best.0.abs_diff(best.1)
            }
            Ordering::Less => false,
        };
        if better {
            best = (health_quarters, energy_quarters);
            best_score = candidate;
        }
    }
    best
}

/// Work out a recovery without touching anything.
pub fn plan(request: RecoveryRequest, pools: &ResourcePools) -> Result<RecoveryPlan, SheetError> {
    let health = &pools.health;
    let energy = &pools.energy;
    let plan = match request {
        RecoveryRequest::Full => RecoveryPlan {
            kind: RecoveryPeriod::Full,
            quarters: 0,
            health_quarters: 0,
            energy_quarters: 0,
            health_per_quarter: per_quarter(health.max),
            energy_per_quarter: per_quarter(energy.max),
            health_restored: health.deficit(),
            energy_restored: energy.deficit(),
        },
        RecoveryRequest::Partial { hours, split } => {
            let quarters = quarters_for(hours)?;
            let (health_quarters, energy_quarters) = match split {
                QuarterSplit::Automatic => optimal_split(quarters, health, energy),
                QuarterSplit::Manual { health_quarters } => {
                    let health_quarters = health_quarters.min(quarters);
                    (health_quarters, quarters - health_quarters)
                }
            };
            RecoveryPlan {
                kind: RecoveryPeriod::Partial,
                quarters,
                health_quarters,
                energy_quarters,
                health_per_quarter: per_quarter(health.max),
                energy_per_quarter: per_quarter(energy.max),
                health_restored: restored(health, health_quarters),
                energy_restored: restored(energy, energy_quarters),
            }
        }
    };
    tracing::debug!(
        kind = ?plan.kind,
        health_quarters = plan.health_quarters,
        energy_quarters = plan.energy_quarters,
        health_restored = plan.health_restored,
        energy_restored = plan.energy_restored,
        "recovery planned"
    );
    Ok(plan)
}

/// Apply a plan: restore pools and reset matching feats and traits.
///
/// Returns how many feats and traits had their uses restored.
pub fn apply(
    plan: &RecoveryPlan,
    pools: &mut ResourcePools,
    feats: &mut FeatLedger,
    traits: &mut [TraitUse],
) -> usize {
    match plan.kind {
        RecoveryPeriod::Full => {
            pools.health.fill();
            pools.energy.fill();
        }
        RecoveryPeriod::Partial => {
            pools.health.current += plan.health_restored;
            pools.energy.current += plan.energy_restored;
        }
    }
    let feats_reset = feats.reset_for(plan.kind);
    let traits_reset = traits
        .iter_mut()
        .map(|entry| entry.reset_for(plan.kind))
        .filter(|reset| *reset)
        .count();
    feats_reset + traits_reset
}

/// Outcome of [`recover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub plan: RecoveryPlan,
    pub entries_reset: usize,
}

/// Plan and apply a recovery on a build in one step.
///
/// The build is left untouched when the request is rejected.
pub fn recover(request: RecoveryRequest, build: &mut CharacterBuild) -> Result<RecoveryReport, SheetError> {
    let plan = plan(request, &build.pools)?;
    let entries_reset = apply(&plan, &mut build.pools, &mut build.feats, &mut build.traits);
    Ok(RecoveryReport {
        plan,
        entries_reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feat::{Feat, FeatCategory};

    fn pools(health: Pool, energy: Pool) -> ResourcePools {
        ResourcePools { health, energy }
    }

    fn partial(hours: u32) -> RecoveryRequest {
        RecoveryRequest::Partial {
            hours,
            split: QuarterSplit::Automatic,
        }
    }

    #[test]
    fn test_quarters_for_hours() {
        assert_eq!(quarters_for(2), Ok(1));
        assert_eq!(quarters_for(4), Ok(2));
        assert_eq!(quarters_for(6), Ok(3));
        assert_eq!(
            quarters_for(3),
            Err(SheetError::InvalidRecoveryDuration { hours: 3 })
        );
        assert!(quarters_for(8).is_err());
        assert!(quarters_for(0).is_err());
    }

    #[test]
    fn test_per_quarter_rounds_up() {
        assert_eq!(per_quarter(20), 5);
        assert_eq!(per_quarter(21), 6);
        assert_eq!(per_quarter(1), 1);
        assert_eq!(per_quarter(0), 0);
    }

    #[test]
    fn test_all_to_health_when_energy_full() {
        let plan = plan(partial(4), &pools(Pool::new(10, 20), Pool::new(20, 20))).unwrap();
        assert_eq!(plan.health_per_quarter, 5);
        assert_eq!((plan.health_quarters, plan.energy_quarters), (2, 0));
        assert_eq!(plan.health_restored, 10);
        assert_eq!(plan.energy_restored, 0);
    }

    #[test]
    fn test_balanced_tie_break() {
        let plan = plan(partial(4), &pools(Pool::new(20, 40), Pool::new(20, 40))).unwrap();
        assert_eq!((plan.health_quarters, plan.energy_quarters), (1, 1));
        assert_eq!(plan.health_restored, 10);
        assert_eq!(plan.energy_restored, 10);
    }

    #[test]
    fn test_capped_pool_stops_earning() {
        // Health only misses 10: one quarter fills it, the rest go to energy.
        let split = optimal_split(3, &Pool::new(30, 40), &Pool::new(0, 40));
        assert_eq!(split, (1, 2));
    }

    #[test]
    fn test_small_deficit_loses_the_quarter() {
        let split = optimal_split(1, &Pool::new(7, 8), &Pool::new(0, 100));
        assert_eq!(split, (0, 1));
    }

    #[test]
    fn test_fraction_not_raw_points() {
        // ceil(9 / 4) restores a third of a 9-point pool, but only a quarter of an 8-point one.
        assert_eq!(optimal_split(1, &Pool::new(0, 9), &Pool::new(0, 8)), (1, 0));
        assert_eq!(optimal_split(1, &Pool::new(0, 8), &Pool::new(0, 9)), (0, 1));
    }

    #[test]
    fn test_both_full_splits_evenly() {
        assert_eq!(optimal_split(3, &Pool::new(10, 10), &Pool::new(10, 10)), (2, 1));
        assert_eq!(optimal_split(2, &Pool::new(10, 10), &Pool::new(10, 10)), (1, 1));
    }

    #[test]
    fn test_odd_quarters_tie_prefers_health() {
        assert_eq!(optimal_split(3, &Pool::new(0, 40), &Pool::new(0, 40)), (2, 1));
    }

    #[test]
    fn test_manual_split_clamped() {
        let request = RecoveryRequest::Partial {
            hours: 4,
            split: QuarterSplit::Manual { health_quarters: 5 },
        };
        let plan = plan(request, &pools(Pool::new(0, 20), Pool::new(0, 20))).unwrap();
        assert_eq!((plan.health_quarters, plan.energy_quarters), (2, 0));
        assert_eq!(plan.health_restored, 10);
    }

    #[test]
    fn test_full_recovery_resets_everything() {
        let mut build = CharacterBuild::new(1);
        build.pools = pools(Pool::new(3, 20), Pool::new(0, 12));
        build
            .feats
            .add(Feat::new("Full", FeatCategory::Character).with_uses(2, RecoveryPeriod::Full))
            .unwrap();
        build
            .feats
            .add(Feat::new("Partial", FeatCategory::Character).with_uses(1, RecoveryPeriod::Partial))
            .unwrap();
        for feat in build.feats.iter_mut() {
            feat.current_uses = Some(0);
        }
        build.traits.push(TraitUse {
            name: "Darkvision Burst".into(),
            max_uses: 1,
            current_uses: 0,
            recovery: Some(RecoveryPeriod::Full),
        });

        let report = recover(RecoveryRequest::Full, &mut build).unwrap();
        assert_eq!(report.plan.health_restored, 17);
        assert_eq!(report.entries_reset, 3);
        assert_eq!(build.pools.health, Pool::new(20, 20));
        assert_eq!(build.pools.energy, Pool::new(12, 12));
        assert!(build.feats.iter().all(|feat| feat.uses_left() == feat.max_uses));
        assert_eq!(build.traits[0].current_uses, 1);
    }

    #[test]
    fn test_partial_recovery_resets_partial_only() {
        let mut build = CharacterBuild::new(1);
        build.pools = pools(Pool::new(10, 20), Pool::new(20, 20));
        build
            .feats
            .add(Feat::new("Full", FeatCategory::Character).with_uses(1, RecoveryPeriod::Full))
            .unwrap();
        build
            .feats
            .add(Feat::new("Partial", FeatCategory::Character).with_uses(1, RecoveryPeriod::Partial))
            .unwrap();
        for feat in build.feats.iter_mut() {
            feat.current_uses = Some(0);
        }

        let report = recover(partial(4), &mut build).unwrap();
        assert_eq!(report.entries_reset, 1);
        assert_eq!(build.pools.health.current, 20);
        let uses: Vec<Option<u32>> = build.feats.iter().map(|feat| feat.uses_left()).collect();
        assert_eq!(uses, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_rejected_request_leaves_build_alone() {
        let mut build = CharacterBuild::new(1);
        build.pools = pools(Pool::new(1, 20), Pool::new(1, 20));
        let before = build.clone();
        assert!(recover(partial(5), &mut build).is_err());
        assert_eq!(build, before);
    }
}
