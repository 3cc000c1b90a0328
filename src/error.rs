//! Error types for point-buy operations.
//!
//! Hard constraints (ability floor, negative-sum cap, sub-skill parentage,
//! defense cap, leveled-feat chains) are reported through the `SheetError`
//! enum. Soft budgets never produce errors; they surface as signed
//! remaining values instead.

use thiserror::Error;

/// Format a prerequisite cycle as a readable string.
fn format_cycle_path(path: &[String]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.join(" -> ")
}

/// Errors returned when an operation would break a hard constraint.
///
/// A rejected operation never mutates the build it was given.
///
/// # Examples
///
/// ```rust
/// use charsheet::SheetError;
///
/// let err = SheetError::BelowMinimum { minimum: -2 };
/// assert_eq!(err.reason(), "Cannot go below -2");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The ability score would drop below the floor.
    #[error("Cannot go below {minimum}")]
    BelowMinimum { minimum: i32 },

    /// The sum of all negative ability scores would drop below the cap.
    #[error("Negative sum cannot exceed {limit}")]
    NegativeSumExceeded { limit: i32 },

    /// The ability score is already at the level maximum.
    #[error("Cannot go above {maximum} at level {level}")]
    AboveMaximum { maximum: i32, level: u32 },

    /// A sub-skill was raised while no valid parent skill is proficient.
    #[error("Skill {skill} requires a proficient parent skill")]
    ParentNotProficient { skill: String },

    /// A defense bonus is already at `max_defense_skill(level)`.
    #[error("Defense bonus is capped at {cap}")]
    DefenseAtCap { cap: u32 },

    /// A leveled feat was added without the level below it.
    #[error("{feat} requires {requires}")]
    MissingPrerequisite { feat: String, requires: String },

    /// The feat, or a higher level of it, is already held.
    #[error("{feat} is already held")]
    AlreadyHeld { feat: String },

    /// The referenced skill is not part of the build.
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// The referenced feat is not part of the build.
    #[error("Unknown feat: {0}")]
    UnknownFeat(String),

    /// Partial recovery only accepts 2, 4 or 6 hours.
    #[error("Invalid recovery duration: {hours} hours")]
    InvalidRecoveryDuration { hours: u32 },

    /// The feat catalog's prerequisites loop back on themselves.
    #[error("Prerequisite cycle detected: {}", format_cycle_path(.path))]
    PrerequisiteCycle { path: Vec<String> },

    /// Rules or catalog data could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SheetError {
    /// The user-facing reason string for a rejected operation.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(err: serde_json::Error) -> Self {
        SheetError::Config(err.to_string())
    }
}
