//! Feat and skill catalog collaborator.
//!
//! Catalog records come from an external store and may reference feats and
//! skills by id or by name. Everything is normalized here, at the boundary:
//! references resolve to ids, the raw `base_skill_id = 0` sentinel becomes
//! [`SkillParent::AnyBase`], and held feats stored either as a bare name or
//! as a record come out as one [`Feat`] shape.

use crate::ability::Ability;
use crate::error::SheetError;
use crate::feat::{Feat, FeatCategory, FeatLedger, RecoveryPeriod};
use crate::skill::{Skill, SkillId, SkillParent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Catalog identifier for a feat.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatId(pub u32);

/// Reference to a catalog record by id or by name.
///
/// # Examples
///
/// ```rust
/// use charsheet::catalog::CatalogRef;
///
/// let by_name: CatalogRef = serde_json::from_str(r#""Action Surge""#).unwrap();
/// let by_id: CatalogRef = serde_json::from_str("12").unwrap();
/// assert_eq!(by_name, CatalogRef::from("Action Surge"));
/// assert_eq!(by_id, CatalogRef::Id(12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogRef {
    Id(u32),
    Name(String),
}

pub type FeatRef = CatalogRef;
pub type SkillRef = CatalogRef;

impl CatalogRef {
    /// Whether a record with this id and name is the one referenced.
    ///
    /// Names compare case-insensitively, ignoring surrounding whitespace.
    pub fn matches(&self, id: Option<impl Into<u32>>, name: &str) -> bool {
        match self {
            CatalogRef::Id(wanted) => {
                let id: Option<u32> = id.map(Into::into);
                id == Some(*wanted)
            }
            CatalogRef::Name(wanted) => wanted.trim().eq_ignore_ascii_case(name.trim()),
        }
    }
}

impl From<&str> for CatalogRef {
    fn from(name: &str) -> Self {
        CatalogRef::Name(name.to_string())
    }
}

impl From<FeatId> for CatalogRef {
    fn from(id: FeatId) -> Self {
        CatalogRef::Id(id.0)
    }
}

impl From<SkillId> for CatalogRef {
    fn from(id: SkillId) -> Self {
        CatalogRef::Id(id.0)
    }
}

impl From<FeatId> for u32 {
    fn from(id: FeatId) -> Self {
        id.0
    }
}

impl From<SkillId> for u32 {
    fn from(id: SkillId) -> Self {
        id.0
    }
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRef::Id(id) => write!(f, "#{}", id),
            CatalogRef::Name(name) => f.write_str(name),
        }
    }
}

/// A single requirement a feat places on the character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Level(u32),
    Ability { ability: Ability, minimum: i32 },
    SkillBonus { skill: SkillId, minimum: i32 },
    /// Another feat, by name.
    Feat(String),
    /// Catalog data that could not be resolved. Never satisfied.
    Unresolved(String),
}

/// A feat as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatDefinition {
    pub id: FeatId,
    pub name: String,
    pub category: FeatCategory,
    pub requirements: Vec<Requirement>,
    pub max_uses: Option<u32>,
    pub recovery: Option<RecoveryPeriod>,
}

/// A skill as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub ability: Ability,
    pub parent: SkillParent,
}

impl SkillDefinition {
    /// A fresh, non-proficient skill for a character sheet.
    pub fn to_skill(&self) -> Skill {
        Skill::sub(self.id.0, self.name.clone(), self.ability, self.parent)
    }
}

/// Lookup interface onto the feat and skill catalog.
pub trait Catalog {
    fn find_feat(&self, feat: &FeatRef) -> Option<&FeatDefinition>;

    fn find_skill(&self, skill: &SkillRef) -> Option<&SkillDefinition>;
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    skills: Vec<SkillDefinition>,
    feats: Vec<FeatDefinition>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_feat(mut self, feat: FeatDefinition) -> Self {
        self.feats.push(feat);
        self
    }

    pub fn feat_definitions(&self) -> &[FeatDefinition] {
        &self.feats
    }

    pub fn skill_definitions(&self) -> &[SkillDefinition] {
        &self.skills
    }

    /// Load a catalog from its raw JSON export.
    ///
    /// Only a structurally broken document is an error. Unknown abilities,
    /// dangling skill references, non-numeric thresholds and level
    /// requirements degrade to [`Requirement::Unresolved`]; a use count that
    /// is not a number means no uses. Records missing an id or name, and
    /// skills with an unknown ability or parent, are skipped with a warning.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::catalog::{Catalog, CatalogRef, InMemoryCatalog};
    /// use charsheet::SkillParent;
    ///
    /// let catalog = InMemoryCatalog::from_json_str(r#"{
    ///     "skills": [
    ///         { "id": 1, "name": "Athletics", "ability": "Strength" },
    ///         { "id": 2, "name": "Lore", "ability": "Intelligence", "base_skill_id": 0 }
    ///     ]
    /// }"#).unwrap();
    ///
    /// let lore = catalog.find_skill(&CatalogRef::from("lore")).unwrap();
    /// assert_eq!(lore.parent, SkillParent::AnyBase);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, SheetError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let mut catalog = InMemoryCatalog::new();

        for value in raw.skills {
            let skill: RawSkill = match serde_json::from_value(value) {
                Ok(skill) => skill,
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed skill record");
                    continue;
                }
            };
            let Some(ability) = Ability::from_name(&skill.ability) else {
                tracing::warn!(skill = %skill.name, ability = %skill.ability, "skipping skill with unknown ability");
                continue;
            };
            let parent = if is_blank(&skill.base_skill_id) {
                SkillParent::Base
            } else {
                match whole_number(&skill.base_skill_id) {
                    Some(0) => SkillParent::AnyBase,
                    Some(id) => SkillParent::Specific(SkillId(id)),
                    None => {
                        tracing::warn!(skill = %skill.name, parent = %skill.base_skill_id, "skipping skill with unreadable parent");
                        continue;
                    }
                }
            };
            catalog.skills.push(SkillDefinition {
                id: SkillId(skill.id),
                name: skill.name,
                ability,
                parent,
            });
        }

        for value in raw.feats {
            let feat: RawFeat = match serde_json::from_value(value) {
                Ok(feat) => feat,
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed feat record");
                    continue;
                }
            };
            let definition = catalog.resolve_feat(feat);
            catalog.feats.push(definition);
        }

        tracing::debug!(
            skills = catalog.skills.len(),
            feats = catalog.feats.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn resolve_feat(&self, raw: RawFeat) -> FeatDefinition {
        let mut requirements = Vec::new();
        if !is_blank(&raw.lvl_req) {
            match whole_number(&raw.lvl_req) {
                Some(level) if level > 1 => requirements.push(Requirement::Level(level)),
                Some(_) => {}
                None => requirements.push(Requirement::Unresolved(format!(
                    "level requirement {}",
                    describe(&raw.lvl_req)
                ))),
            }
        }

        let ability_values = entries(&raw.abil_req_val);
        for (idx, name) in entries(&raw.ability_req).iter().enumerate() {
            let ability = text(name).and_then(Ability::from_name);
            let requirement = match (ability, threshold(ability_values.get(idx))) {
                (Some(ability), Some(minimum)) => Requirement::Ability { ability, minimum },
                _ => Requirement::Unresolved(format!("ability requirement {}", describe(name))),
            };
            requirements.push(requirement);
        }

        let skill_values = entries(&raw.skill_req_val);
        for (idx, value) in entries(&raw.skill_req).iter().enumerate() {
            let skill_ref = catalog_ref(value);
            let skill = skill_ref
                .as_ref()
                .and_then(|skill_ref| self.find_skill(skill_ref))
                .map(|skill| skill.id);
            let requirement = match (skill, threshold(skill_values.get(idx))) {
                (Some(skill), Some(minimum)) => Requirement::SkillBonus { skill, minimum },
                _ => Requirement::Unresolved(match skill_ref {
                    Some(skill_ref) => format!("skill requirement {}", skill_ref),
                    None => format!("skill requirement {}", describe(value)),
                }),
            };
            requirements.push(requirement);
        }

        if let Some(prerequisite) = text(&raw.feat_req) {
            requirements.push(Requirement::Feat(prerequisite.to_string()));
        }

        FeatDefinition {
            id: FeatId(raw.id),
            name: raw.name,
            category: parse_category(text(&raw.category)),
            requirements,
            max_uses: whole_number(&raw.uses_per_rec).filter(|uses| *uses > 0),
            recovery: parse_recovery(text(&raw.rec_period)),
        }
    }
}

impl Catalog for InMemoryCatalog {
    fn find_feat(&self, feat: &FeatRef) -> Option<&FeatDefinition> {
        self.feats
            .iter()
            .find(|definition| feat.matches(Some(definition.id), &definition.name))
    }

    fn find_skill(&self, skill: &SkillRef) -> Option<&SkillDefinition> {
        self.skills
            .iter()
            .find(|definition| skill.matches(Some(definition.id), &definition.name))
    }
}

fn threshold(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Non-negative integer from a number or a numeric string.
fn whole_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|text| !text.is_empty())
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Array items; `null` is empty and a lone scalar counts as one item.
fn entries(value: &Value) -> &[Value] {
    match value {
        Value::Null => &[],
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    }
}

fn catalog_ref(value: &Value) -> Option<CatalogRef> {
    match value {
        Value::Number(_) => whole_number(value).map(CatalogRef::Id),
        Value::String(_) => text(value).map(CatalogRef::from),
        _ => None,
    }
}

fn parse_category(raw: Option<&str>) -> FeatCategory {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("archetype") => FeatCategory::Archetype,
        Some("state") => FeatCategory::State,
        _ => FeatCategory::Character,
    }
}

fn parse_recovery(raw: Option<&str>) -> Option<RecoveryPeriod> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("full") | Some("full recovery") => Some(RecoveryPeriod::Full),
        Some("partial") | Some("partial recovery") => Some(RecoveryPeriod::Partial),
        _ => None,
    }
}

// Records are decoded one at a time so a bad one only costs itself.
#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    skills: Vec<Value>,
    #[serde(default)]
    feats: Vec<Value>,
}

#[derive(Deserialize)]
struct RawSkill {
    id: u32,
    name: String,
    ability: String,
    #[serde(default)]
    base_skill_id: Value,
}

#[derive(Deserialize)]
struct RawFeat {
    id: u32,
    name: String,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    lvl_req: Value,
    #[serde(default)]
    ability_req: Value,
    #[serde(default)]
    abil_req_val: Value,
    #[serde(default)]
    skill_req: Value,
    #[serde(default)]
    skill_req_val: Value,
    #[serde(default)]
    feat_req: Value,
    #[serde(default)]
    uses_per_rec: Value,
    #[serde(default)]
    rec_period: Value,
}

/// A held feat as found in stored character records: either a bare name or
/// a record carrying its own use counters.
///
/// Record fields stay loosely typed; counters given as numeric strings are
/// accepted and anything unreadable is treated as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HeldFeatEntry {
    Name(String),
    Record {
        #[serde(default)]
        id: Value,
        name: String,
        #[serde(default)]
        category: Value,
        #[serde(default, alias = "maxUses")]
        max_uses: Value,
        #[serde(default, alias = "currentUses")]
        current_uses: Value,
        #[serde(default, alias = "recoveryPeriod")]
        recovery: Value,
    },
    /// Neither a name nor a named record; dropped during normalization.
    Unrecognized(Value),
}

/// Turn stored feat entries into a ledger, filling details from the catalog.
///
/// Names missing from the catalog still produce a feat, with no catalog id.
pub fn normalize_held_feats(entries: Vec<HeldFeatEntry>, catalog: &dyn Catalog) -> FeatLedger {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            HeldFeatEntry::Name(name) => Some(match catalog.find_feat(&CatalogRef::from(name.as_str())) {
                Some(definition) => Feat::from_definition(definition),
                None => {
                    tracing::warn!(feat = %name, "held feat not found in catalog");
                    Feat::new(name, FeatCategory::Character)
                }
            }),
            HeldFeatEntry::Unrecognized(value) => {
                tracing::warn!(entry = %value, "skipping unreadable held feat");
                None
            }
            HeldFeatEntry::Record {
                id,
                name,
                category,
                max_uses,
                current_uses,
                recovery,
            } => {
                let id = whole_number(&id);
                let definition = id
                    .and_then(|id| catalog.find_feat(&CatalogRef::Id(id)))
                    .or_else(|| catalog.find_feat(&CatalogRef::from(name.as_str())));
                let mut feat = match definition {
                    Some(definition) => Feat::from_definition(definition),
                    None => Feat {
                        id: id.map(FeatId),
                        name,
                        category: parse_category(text(&category)),
                        max_uses: whole_number(&max_uses).filter(|uses| *uses > 0),
                        current_uses: None,
                        recovery: parse_recovery(text(&recovery)),
                    },
                };
                if let Some(max) = feat.max_uses {
                    let current = whole_number(&current_uses).unwrap_or(max);
                    feat.current_uses = Some(current.min(max));
                }
                Some(feat)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "skills": [
            { "id": 1, "name": "Athletics", "ability": "strength" },
            { "id": 2, "name": "Climbing", "ability": "Strength", "base_skill_id": 1 },
            { "id": 3, "name": "Lore", "ability": "Intelligence", "base_skill_id": 0 },
            { "id": 4, "name": "Luck", "ability": "Fortune" }
        ],
        "feats": [
            {
                "id": 10,
                "name": "Action Surge",
                "category": "Archetype",
                "lvl_req": 2,
                "ability_req": ["Strength"],
                "abil_req_val": [2],
                "skill_req": ["Athletics", 99],
                "skill_req_val": ["3", 1],
                "uses_per_rec": 1,
                "rec_period": "Partial"
            },
            {
                "id": 11,
                "name": "Action Surge II",
                "category": "archetype",
                "ability_req": ["Agility"],
                "abil_req_val": ["lots"],
                "feat_req": "Action Surge"
            }
        ]
    }"#;

    #[test]
    fn test_skill_parents_normalized() {
        let catalog = InMemoryCatalog::from_json_str(CATALOG).unwrap();
        let parent = |id| catalog.find_skill(&CatalogRef::Id(id)).map(|s| s.parent);
        assert_eq!(parent(1), Some(SkillParent::Base));
        assert_eq!(parent(2), Some(SkillParent::Specific(SkillId(1))));
        assert_eq!(parent(3), Some(SkillParent::AnyBase));
        assert_eq!(parent(4), None);
    }

    #[test]
    fn test_feat_requirements_resolved() {
        let catalog = InMemoryCatalog::from_json_str(CATALOG).unwrap();
        let surge = catalog.find_feat(&FeatRef::from("action surge")).unwrap();
        assert_eq!(surge.category, FeatCategory::Archetype);
        assert_eq!(surge.max_uses, Some(1));
        assert_eq!(surge.recovery, Some(RecoveryPeriod::Partial));
        assert_eq!(
            surge.requirements,
            vec![
                Requirement::Level(2),
                Requirement::Ability {
                    ability: Ability::Strength,
                    minimum: 2
                },
                Requirement::SkillBonus {
                    skill: SkillId(1),
                    minimum: 3
                },
                Requirement::Unresolved("skill requirement #99".into()),
            ]
        );
    }

    #[test]
    fn test_malformed_threshold_is_unresolved() {
        let catalog = InMemoryCatalog::from_json_str(CATALOG).unwrap();
        let surge_two = catalog.find_feat(&FeatRef::Id(11)).unwrap();
        assert_eq!(
            surge_two.requirements,
            vec![
                Requirement::Unresolved("ability requirement Agility".into()),
                Requirement::Feat("Action Surge".into()),
            ]
        );
    }

    #[test]
    fn test_broken_document_is_error() {
        assert!(InMemoryCatalog::from_json_str(r#"{ "skills": 3 }"#).is_err());
    }

    #[test]
    fn test_held_feats_normalized() {
        let catalog = InMemoryCatalog::from_json_str(CATALOG).unwrap();
        let entries: Vec<HeldFeatEntry> = serde_json::from_str(
            r#"[
                "Action Surge",
                { "name": "Action Surge", "currentUses": 0 },
                { "name": "Homebrew", "maxUses": 3, "currentUses": 7, "recoveryPeriod": "full" },
                "Unknown Feat"
            ]"#,
        )
        .unwrap();

        let ledger = normalize_held_feats(entries, &catalog);
        let feats: Vec<&Feat> = ledger.iter().collect();
        assert_eq!(feats.len(), 4);

        assert_eq!(feats[0].id, Some(FeatId(10)));
        assert_eq!(feats[0].uses_left(), Some(1));

        assert_eq!(feats[1].id, Some(FeatId(10)));
        assert_eq!(feats[1].uses_left(), Some(0));

        assert_eq!(feats[2].id, None);
        assert_eq!(feats[2].current_uses, Some(3));
        assert_eq!(feats[2].recovery, Some(RecoveryPeriod::Full));

        assert_eq!(feats[3].name, "Unknown Feat");
        assert_eq!(feats[3].max_uses, None);
    }

    const LOOSE_CATALOG: &str = r#"{
        "skills": [
            { "id": 1, "name": "Athletics", "ability": "Strength", "base_skill_id": null },
            { "id": 2, "name": "Climbing", "ability": "Strength", "base_skill_id": "1" },
            { "id": 3, "name": "Lore", "ability": "Intelligence", "base_skill_id": "0" },
            { "id": 4, "name": "Juggling", "ability": "Agility", "base_skill_id": "x" },
            { "name": "Tumbling", "ability": "Agility" }
        ],
        "feats": [
            { "id": 1, "name": "Toughness", "lvl_req": null, "ability_req": null, "uses_per_rec": null },
            { "id": 2, "name": "Cleave", "lvl_req": "3", "uses_per_rec": "1", "rec_period": "full" },
            { "id": 3, "name": "Riposte", "lvl_req": "high", "uses_per_rec": "often" },
            { "id": 4, "name": "Bulwark", "ability_req": [7], "abil_req_val": [1],
              "skill_req": [null], "feat_req": 5 },
            { "name": "Nameless" }
        ]
    }"#;

    #[test]
    fn test_loose_skill_fields_keep_valid_records() {
        let catalog = InMemoryCatalog::from_json_str(LOOSE_CATALOG).unwrap();
        let parent = |id| catalog.find_skill(&CatalogRef::Id(id)).map(|s| s.parent);
        assert_eq!(catalog.skill_definitions().len(), 3);
        assert_eq!(parent(1), Some(SkillParent::Base));
        assert_eq!(parent(2), Some(SkillParent::Specific(SkillId(1))));
        assert_eq!(parent(3), Some(SkillParent::AnyBase));
        assert_eq!(parent(4), None);
    }

    #[test]
    fn test_loose_feat_fields_degrade() {
        let catalog = InMemoryCatalog::from_json_str(LOOSE_CATALOG).unwrap();
        assert_eq!(catalog.feat_definitions().len(), 4);

        let toughness = catalog.find_feat(&FeatRef::Id(1)).unwrap();
        assert!(toughness.requirements.is_empty());
        assert_eq!(toughness.max_uses, None);

        let cleave = catalog.find_feat(&FeatRef::Id(2)).unwrap();
        assert_eq!(cleave.requirements, vec![Requirement::Level(3)]);
        assert_eq!(cleave.max_uses, Some(1));
        assert_eq!(cleave.recovery, Some(RecoveryPeriod::Full));

        let riposte = catalog.find_feat(&FeatRef::Id(3)).unwrap();
        assert_eq!(
            riposte.requirements,
            vec![Requirement::Unresolved("level requirement high".into())]
        );
        assert_eq!(riposte.max_uses, None);

        let bulwark = catalog.find_feat(&FeatRef::Id(4)).unwrap();
        assert_eq!(
            bulwark.requirements,
            vec![
                Requirement::Unresolved("ability requirement 7".into()),
                Requirement::Unresolved("skill requirement null".into()),
            ]
        );
    }

    #[test]
    fn test_held_feat_counters_as_strings() {
        let catalog = InMemoryCatalog::from_json_str(CATALOG).unwrap();
        let entries: Vec<HeldFeatEntry> = serde_json::from_str(
            r#"[
                { "name": "Homebrew", "id": "77", "maxUses": "2", "currentUses": "1" },
                { "name": "Patchwork", "maxUses": "many", "currentUses": null },
                42
            ]"#,
        )
        .unwrap();

        let ledger = normalize_held_feats(entries, &catalog);
        let feats: Vec<&Feat> = ledger.iter().collect();
        assert_eq!(feats.len(), 2);

        assert_eq!(feats[0].id, Some(FeatId(77)));
        assert_eq!(feats[0].max_uses, Some(2));
        assert_eq!(feats[0].current_uses, Some(1));

        assert_eq!(feats[1].name, "Patchwork");
        assert_eq!(feats[1].max_uses, None);
        assert_eq!(feats[1].current_uses, None);
    }
}
