//! # charsheet - Deterministic Point-Buy Engine for Tabletop Character Sheets
//!
//! A calculation library for a tabletop RPG character sheet that provides:
//! - **Point-buy pricing** for abilities, skills, defenses and proficiency
//! - **Derived statistics** recomputed from a build snapshot
//! - **Feat tracking** with leveled feats, limited uses and prerequisites
//! - **Recovery allocation** of health and energy during rests
//! - **Creature budgets** in training points
//!
//! ## Core Concepts
//!
//! ### Build Pipeline
//!
//! Data flows one way:
//!
//! ```text
//! [CharacterBuild] → [budgets] → [DerivedStats] → [recovery]
//! ```
//!
//! 1. **CharacterBuild** is owned by the caller and holds every choice
//! 2. **Budgets** price each choice and report what is left (soft, may go negative)
//! 3. **DerivedStats** are recomputed from the build, never cached
//! 4. **Recovery** restores pools and resets feat/trait uses
//!
//! Hard rules (minimum scores, caps, missing prerequisites) reject a change
//! with a [`SheetError`] and leave the build untouched.
//!
//! ## Example
//!
//! ```rust
//! use charsheet::*;
//!
//! let mut build = CharacterBuild::new(1);
//! let formulas = StandardFormulas::default();
//!
//! // Buy two points of agility
//! ability::increase(&mut build.abilities, Ability::Agility, build.level).unwrap();
//! ability::increase(&mut build.abilities, Ability::Agility, build.level).unwrap();
//!
//! let stats = DerivedStats::compute(&build, &formulas);
//! assert_eq!(stats.evasion, 12);
//! assert_eq!(stats.defenses[&Defense::Reflex], 12);
//!
//! let budget = BudgetReport::compute(&build, &formulas, feat::SlotLimits::default());
//! assert_eq!(budget.abilities.remaining(), 5);
//! ```
//!
//! ## Modules
//!
//! - [`ability`] - Ability scores and their point costs
//! - [`skill`] - Skills, sub-skills and proficiency
//! - [`defense`] - Defense bonuses
//! - [`proficiency`] - Archetype power/martial proficiency
//! - [`feat`] - Held feats, traits and slot usage
//! - [`prerequisite`] - Feat prerequisite graph
//! - [`derived`] - Derived statistics
//! - [`budget`] - Budget summary
//! - [`recovery`] - Rest and recovery
//! - [`creature`] - Creature training points
//! - [`catalog`] - Feat and skill catalog lookups
//! - [`character`] - The build snapshot
//! - [`rules`] - Formula configuration
//! - [`error`] - Error types

pub mod ability;
pub mod budget;
pub mod catalog;
pub mod character;
pub mod creature;
pub mod defense;
pub mod derived;
pub mod error;
pub mod feat;
pub mod prerequisite;
pub mod proficiency;
pub mod recovery;
pub mod rules;
pub mod skill;

// Re-export main types for convenience
pub use ability::{Abilities, Ability};
pub use budget::{BudgetReport, PointBudget};
pub use character::{CharacterBuild, Pool, PoolAllocation, ResourcePools};
pub use defense::{Defense, DefenseSkills};
pub use derived::{Breakdown, DerivedStats};
pub use error::SheetError;
pub use proficiency::{Archetype, ArchetypeKind};
pub use rules::{Formulas, RulesConfig, StandardFormulas};
pub use skill::{Skill, SkillId, SkillParent};

// Re-export feat and catalog types
pub use catalog::{Catalog, FeatDefinition, FeatId, InMemoryCatalog, Requirement, SkillDefinition};
pub use feat::{Feat, FeatCategory, FeatLedger, RecoveryPeriod, TraitUse};
pub use prerequisite::PrerequisiteGraph;

// Re-export recovery and creature types
pub use creature::{CreatureBuild, EquippedItem, ItemKind, SelectedPart, TrainingPointReport};
pub use recovery::{QuarterSplit, RecoveryPlan, RecoveryReport, RecoveryRequest};
