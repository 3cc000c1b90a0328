//! Feat ledger: leveled feat chains, slot accounting and use counters.
//!
//! A feat whose name ends in a roman numeral (I to X) is a leveled variant
//! of the base-named feat. Holding level N-1 is required before level N can
//! be added, and the new level replaces the old one in place.

use crate::catalog::{FeatDefinition, FeatId, FeatRef, Requirement};
use crate::character::CharacterBuild;
use crate::error::SheetError;
use crate::skill;
use serde::{Deserialize, Serialize};

const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Which slot pool a feat draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatCategory {
    Archetype,
    #[default]
    Character,
    /// State feats do not consume a slot.
    State,
}

/// When a limited-use ability gets its uses back.
///
/// Also names the kind of recovery being taken: a full recovery resets
/// everything with a period, a partial one only `Partial` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPeriod {
    Full,
    Partial,
}

impl RecoveryPeriod {
    /// Whether something tagged with `self` resets during `event`.
    pub fn resets_on(self, event: RecoveryPeriod) -> bool {
        match event {
            RecoveryPeriod::Full => true,
            RecoveryPeriod::Partial => self == RecoveryPeriod::Partial,
        }
    }
}

/// Anything with uses restored by recovery.
pub trait Recoverable {
    fn recovery_period(&self) -> Option<RecoveryPeriod>;

    /// Restore every use.
    fn restore_uses(&mut self);

    /// Restore uses if this entry resets on `event`. Returns whether it did.
    fn reset_for(&mut self, event: RecoveryPeriod) -> bool {
        match self.recovery_period() {
            Some(period) if period.resets_on(event) => {
                self.restore_uses();
                true
            }
            _ => false,
        }
    }
}

/// A feat held by a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feat {
    /// Catalog id; `None` when the feat is not in the catalog.
    #[serde(default)]
    pub id: Option<FeatId>,
    pub name: String,
    #[serde(default)]
    pub category: FeatCategory,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub current_uses: Option<u32>,
    #[serde(default)]
    pub recovery: Option<RecoveryPeriod>,
}

impl Feat {
    pub fn new(name: impl Into<String>, category: FeatCategory) -> Self {
        Self {
            id: None,
            name: name.into(),
            category,
            max_uses: None,
            current_uses: None,
            recovery: None,
        }
    }

    /// Give the feat `max_uses` uses per `recovery` period, starting full.
    pub fn with_uses(mut self, max_uses: u32, recovery: RecoveryPeriod) -> Self {
        self.max_uses = Some(max_uses);
        self.current_uses = Some(max_uses);
        self.recovery = Some(recovery);
        self
    }

    pub fn from_definition(definition: &FeatDefinition) -> Self {
        Self {
            id: Some(definition.id),
            name: definition.name.clone(),
            category: definition.category,
            max_uses: definition.max_uses,
            current_uses: definition.max_uses,
            recovery: definition.recovery,
        }
    }

    /// Uses left, clamped to `[0, max_uses]`; `None` for unlimited feats.
    pub fn uses_left(&self) -> Option<u32> {
        self.max_uses
            .map(|max| self.current_uses.unwrap_or(max).min(max))
    }

    pub fn leveled_name(&self) -> LeveledName {
        LeveledName::parse(&self.name)
    }
}

impl Recoverable for Feat {
    fn recovery_period(&self) -> Option<RecoveryPeriod> {
        self.recovery
    }

    fn restore_uses(&mut self) {
        if let Some(max) = self.max_uses {
            self.current_uses = Some(max);
        }
    }
}

/// A species or ancestry trait with limited uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitUse {
    pub name: String,
    pub max_uses: u32,
    pub current_uses: u32,
    #[serde(default)]
    pub recovery: Option<RecoveryPeriod>,
}

impl Recoverable for TraitUse {
    fn recovery_period(&self) -> Option<RecoveryPeriod> {
        self.recovery
    }

    fn restore_uses(&mut self) {
        self.current_uses = self.max_uses;
    }
}

/// A feat name split into its base name and level.
///
/// # Examples
///
/// ```rust
/// use charsheet::feat::LeveledName;
///
/// let name = LeveledName::parse("Action Surge III");
/// assert_eq!(name.base, "Action Surge");
/// assert_eq!(name.level, 3);
/// assert_eq!(name.prerequisite().as_deref(), Some("Action Surge II"));
///
/// let name = LeveledName::parse("Action Surge");
/// assert_eq!(name.level, 1);
/// assert_eq!(name.prerequisite(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledName {
    pub base: String,
    pub level: u32,
}

impl LeveledName {
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if let Some((base, suffix)) = trimmed.rsplit_once(' ') {
            if let Some(level) = roman_level(suffix) {
                let base = base.trim_end();
                if !base.is_empty() {
                    return Self {
                        base: base.to_string(),
                        level,
                    };
                }
            }
        }
        Self {
            base: trimmed.to_string(),
            level: 1,
        }
    }

    /// Name of the level directly below, if any.
    ///
    /// Level 1 goes by the bare base name; "X I" is accepted in its place.
    pub fn prerequisite(&self) -> Option<String> {
        match self.level {
            0 | 1 => None,
            2 => Some(self.base.clone()),
            level => Some(format!("{} {}", self.base, NUMERALS[level as usize - 2])),
        }
    }

    pub fn same_base(&self, other: &LeveledName) -> bool {
        self.base.eq_ignore_ascii_case(&other.base)
    }
}

fn roman_level(token: &str) -> Option<u32> {
    NUMERALS
        .iter()
        .position(|numeral| *numeral == token)
        .map(|idx| idx as u32 + 1)
}

/// Externally supplied slot maxima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLimits {
    pub archetype: u32,
    pub character: u32,
}

/// Slot usage against the limits. Remaining values go negative on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    pub archetype_used: u32,
    pub archetype_max: u32,
    pub character_used: u32,
    pub character_max: u32,
}

impl SlotUsage {
    pub fn archetype_remaining(&self) -> i32 {
        self.archetype_max as i32 - self.archetype_used as i32
    }

    pub fn character_remaining(&self) -> i32 {
        self.character_max as i32 - self.character_used as i32
    }

    pub fn is_over(&self) -> bool {
        self.archetype_remaining() < 0 || self.character_remaining() < 0
    }
}

/// The feats a character holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatLedger {
    feats: Vec<Feat>,
}

impl FeatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feat> {
        self.feats.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Feat> {
        self.feats.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.feats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feats.is_empty()
    }

    pub fn get(&self, feat: &FeatRef) -> Option<&Feat> {
        self.feats.iter().find(|held| feat.matches(held.id, &held.name))
    }

    /// Whether a feat with this exact name (case-insensitive) is held.
    pub fn holds(&self, name: &str) -> bool {
        self.feats
            .iter()
            .any(|held| held.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether `name` is held, counting a higher level of the same leveled
    /// feat as holding the lower one.
    pub fn satisfies(&self, name: &str) -> bool {
        let wanted = LeveledName::parse(name);
        self.feats.iter().any(|held| {
            let held = held.leveled_name();
            held.same_base(&wanted) && held.level >= wanted.level
        })
    }

    fn holds_level(&self, wanted: &LeveledName) -> Option<usize> {
        self.feats.iter().position(|held| {
            let held = held.leveled_name();
            held.same_base(wanted) && held.level == wanted.level
        })
    }

    /// Add a feat, replacing the level below it for leveled feats.
    ///
    /// Returns the feat that was replaced, if any. A feat the ledger already
    /// satisfies, at this level or higher, is rejected. Slot limits are not
    /// checked here; see [`FeatLedger::slot_usage`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::feat::{Feat, FeatCategory, FeatLedger};
    ///
    /// let mut ledger = FeatLedger::new();
    /// assert!(ledger.add(Feat::new("Action Surge II", FeatCategory::Archetype)).is_err());
    ///
    /// ledger.add(Feat::new("Action Surge", FeatCategory::Archetype)).unwrap();
    /// let replaced = ledger.add(Feat::new("Action Surge II", FeatCategory::Archetype)).unwrap();
    /// assert_eq!(replaced.unwrap().name, "Action Surge");
    /// assert_eq!(ledger.len(), 1);
    ///
    /// // Level 1 is already covered by level 2.
    /// assert!(ledger.add(Feat::new("Action Surge", FeatCategory::Archetype)).is_err());
    /// ```
    pub fn add(&mut self, feat: Feat) -> Result<Option<Feat>, SheetError> {
        if self.satisfies(&feat.name) {
            return Err(SheetError::AlreadyHeld { feat: feat.name });
        }
        let leveled = feat.leveled_name();
        if leveled.level <= 1 {
            self.feats.push(feat);
            return Ok(None);
        }
        let below = LeveledName {
            base: leveled.base.clone(),
            level: leveled.level - 1,
        };
        match self.holds_level(&below) {
            Some(idx) => {
                tracing::trace!(from = %self.feats[idx].name, to = %feat.name, "leveled feat replaced");
                Ok(Some(std::mem::replace(&mut self.feats[idx], feat)))
            }
            None => Err(SheetError::MissingPrerequisite {
                requires: leveled.prerequisite().unwrap_or(below.base),
                feat: feat.name,
            }),
        }
    }

    pub fn remove(&mut self, feat: &FeatRef) -> Result<Feat, SheetError> {
        let idx = self.index_of(feat)?;
        Ok(self.feats.remove(idx))
    }

    fn index_of(&self, feat: &FeatRef) -> Result<usize, SheetError> {
        self.feats
            .iter()
            .position(|held| feat.matches(held.id, &held.name))
            .ok_or_else(|| SheetError::UnknownFeat(feat.to_string()))
    }

    /// Spend one use. Returns uses left, or `None` for unlimited feats.
    pub fn use_feat(&mut self, feat: &FeatRef) -> Result<Option<u32>, SheetError> {
        let idx = self.index_of(feat)?;
        let held = &mut self.feats[idx];
        let left = held.uses_left().map(|left| left.saturating_sub(1));
        if left.is_some() {
            held.current_uses = left;
        }
        Ok(left)
    }

    /// Give back one use, up to the maximum.
    pub fn recover_feat(&mut self, feat: &FeatRef) -> Result<Option<u32>, SheetError> {
        let idx = self.index_of(feat)?;
        let held = &mut self.feats[idx];
        let left = match (held.uses_left(), held.max_uses) {
            (Some(left), Some(max)) => Some((left + 1).min(max)),
            _ => None,
        };
        if left.is_some() {
            held.current_uses = left;
        }
        Ok(left)
    }

    /// Restore uses on every feat that resets during `event`.
    pub fn reset_for(&mut self, event: RecoveryPeriod) -> usize {
        self.feats
            .iter_mut()
            .map(|feat| feat.reset_for(event))
            .filter(|reset| *reset)
            .count()
    }

    pub fn slot_usage(&self, limits: SlotLimits) -> SlotUsage {
        let count = |category| {
            self.feats
                .iter()
                .filter(|feat| feat.category == category)
                .count() as u32
        };
        SlotUsage {
            archetype_used: count(FeatCategory::Archetype),
            archetype_max: limits.archetype,
            character_used: count(FeatCategory::Character),
            character_max: limits.character,
        }
    }
}

impl FromIterator<Feat> for FeatLedger {
    fn from_iter<I: IntoIterator<Item = Feat>>(iter: I) -> Self {
        Self {
            feats: iter.into_iter().collect(),
        }
    }
}

/// List every catalog requirement `build` does not meet.
///
/// Unresolved catalog data is always reported as unmet.
pub fn unmet_requirements<'a>(
    definition: &'a FeatDefinition,
    build: &CharacterBuild,
) -> Vec<&'a Requirement> {
    definition
        .requirements
        .iter()
        .filter(|requirement| !requirement_met(requirement, build))
        .collect()
}

fn requirement_met(requirement: &Requirement, build: &CharacterBuild) -> bool {
    match requirement {
        Requirement::Level(level) => build.level >= *level,
        Requirement::Ability { ability, minimum } => build.abilities.get(*ability) >= *minimum,
        Requirement::SkillBonus { skill, minimum } => build
            .skills
            .iter()
            .find(|held| held.id == *skill)
            .map(|held| skill::skill_bonus(held, &build.abilities) >= *minimum)
            .unwrap_or(false),
        Requirement::Feat(name) => build.feats.satisfies(name),
        Requirement::Unresolved(detail) => {
            tracing::warn!(%detail, "unresolved feat requirement treated as unmet");
            false
        }
    }
}
