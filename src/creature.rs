//! Creature training-point budget.
//!
//! Creatures pay for equipped armaments, powers and techniques in training
//! points. Each selected part costs `⌊base + Σ(rate × level)⌋`. When
//! several items take the same part, only the highest option-level copy is
//! charged; weapon damage and additional damage parts are told apart by
//! damage type, so fire and cold damage are charged separately.

use crate::ability::{self, Abilities};
use crate::feat::FeatLedger;
use crate::rules::Formulas;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of thing a creature has equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Armament,
    Power,
    Technique,
}

/// One option on a part, bought `level` times at `rate` each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartOption {
    pub rate: f64,
    pub level: u32,
}

/// A part or property selected on an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPart {
    pub name: String,
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub options: Vec<PartOption>,
    #[serde(default)]
    pub damage_type: Option<String>,
}

impl SelectedPart {
    pub fn new(name: impl Into<String>, base: f64) -> Self {
        Self {
            name: name.into(),
            base,
            options: Vec::new(),
            damage_type: None,
        }
    }

    pub fn with_option(mut self, rate: f64, level: u32) -> Self {
        self.options.push(PartOption { rate, level });
        self
    }

    pub fn with_damage_type(mut self, damage_type: impl Into<String>) -> Self {
        self.damage_type = Some(damage_type.into());
        self
    }

    /// `⌊base + Σ(rate × level)⌋`, rounded to micro-points first so that
    /// float noise never drops a whole point.
    pub fn training_points(&self) -> i32 {
        let raw = self.base
            + self
                .options
                .iter()
                .map(|option| option.rate * option.level as f64)
                .sum::<f64>();
        ((raw * 1e6).round() / 1e6).floor() as i32
    }

    /// Combined level of every option.
    pub fn option_level(&self) -> u32 {
        self.options.iter().map(|option| option.level).sum()
    }

    pub fn is_damage_part(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name.contains("weapon damage") || name.contains("additional damage")
    }

    /// Identity used to de-duplicate this part across items.
    pub fn dedup_key(&self) -> String {
        let name = self.name.trim().to_ascii_lowercase();
        if self.is_damage_part() {
            let damage_type = self
                .damage_type
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase();
            format!("{}|{}", name, damage_type)
        } else {
            name
        }
    }
}

/// An armament, power or technique a creature has equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub parts: Vec<SelectedPart>,
}

impl EquippedItem {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: SelectedPart) -> Self {
        self.parts.push(part);
        self
    }
}

/// A part that is actually charged after de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCharge {
    pub key: String,
    pub part: String,
    /// The item whose copy of the part is charged.
    pub item: String,
    pub option_level: u32,
    pub training_points: i32,
}

/// Parts that count toward the budget, in first-seen order.
///
/// # Examples
///
/// ```rust
/// use charsheet::creature::{charged_parts, EquippedItem, ItemKind, SelectedPart};
///
/// let claws = EquippedItem::new("Claws", ItemKind::Armament)
///     .with_part(SelectedPart::new("Reach", 1.0).with_option(1.0, 1));
/// let tail = EquippedItem::new("Tail", ItemKind::Armament)
///     .with_part(SelectedPart::new("Reach", 1.0).with_option(1.0, 2));
///
/// let charges = charged_parts(&[claws, tail]);
/// assert_eq!(charges.len(), 1);
/// assert_eq!(charges[0].item, "Tail");
/// assert_eq!(charges[0].training_points, 3);
/// ```
pub fn charged_parts(items: &[EquippedItem]) -> Vec<PartCharge> {
    let mut charges: Vec<PartCharge> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for item in items {
        for part in &item.parts {
            let charge = PartCharge {
                key: part.dedup_key(),
                part: part.name.clone(),
                item: item.name.clone(),
                option_level: part.option_level(),
                training_points: part.training_points(),
            };
            match by_key.get(&charge.key) {
                Some(&idx) => {
                    let held = &charges[idx];
                    if (charge.option_level, charge.training_points)
                        > (held.option_level, held.training_points)
                    {
                        charges[idx] = charge;
                    }
                }
                None => {
                    by_key.insert(charge.key.clone(), charges.len());
                    charges.push(charge);
                }
            }
        }
    }
    charges
}

/// Training points spent on `items` after de-duplication.
pub fn training_points_spent(items: &[EquippedItem]) -> i32 {
    charged_parts(items)
        .iter()
        .map(|charge| charge.training_points)
        .sum()
}

/// Training points against the level budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPointReport {
    pub total: i32,
    pub spent: i32,
    /// Negative when overspent.
    pub remaining: i32,
    pub charges: Vec<PartCharge>,
}

/// A creature build. Owned by the caller; nothing here is global.
///
/// Resistances, immunities and feats are stored with the creature but do not
/// cost training points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureBuild {
    pub name: String,
    pub level: u32,
    pub abilities: Abilities,
    pub items: Vec<EquippedItem>,
    pub resistances: Vec<String>,
    pub immunities: Vec<String>,
    pub feats: FeatLedger,
}

impl CreatureBuild {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level: level.max(1),
            ..Default::default()
        }
    }

    pub fn equip(&mut self, item: EquippedItem) {
        self.items.push(item);
    }

    /// Training points spent and remaining at this creature's level.
    pub fn training_points(&self, formulas: &dyn Formulas) -> TrainingPointReport {
        let charges = charged_parts(&self.items);
        let total = formulas.training_points(self.level);
        let spent = charges.iter().map(|charge| charge.training_points).sum();
        let report = TrainingPointReport {
            total,
            spent,
            remaining: total - spent,
            charges,
        };
        tracing::debug!(
            creature = %self.name,
            total = report.total,
            spent = report.spent,
            "training points computed"
        );
        if report.remaining < 0 {
            tracing::warn!(creature = %self.name, over = -report.remaining, "training points overspent");
        }
        report
    }

    /// Ability points unspent at this creature's level; negative when overspent.
    pub fn ability_points_remaining(&self, formulas: &dyn Formulas) -> i32 {
        formulas.ability_points(self.level) - ability::points_spent(&self.abilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;
    use crate::rules::StandardFormulas;

    fn weapon(name: &str, damage_type: &str, level: u32) -> EquippedItem {
        EquippedItem::new(name, ItemKind::Armament).with_part(
            SelectedPart::new("Weapon Damage", 1.0)
                .with_option(1.5, level)
                .with_damage_type(damage_type),
        )
    }

    #[test]
    fn test_part_cost_floors() {
        let part = SelectedPart::new("Weapon Damage", 1.0).with_option(1.5, 1);
        assert_eq!(part.training_points(), 2);
        let part = SelectedPart::new("Precise", 0.0).with_option(0.1, 3).with_option(0.35, 2);
        assert_eq!(part.training_points(), 1);
        let part = SelectedPart::new("Precise", 0.0).with_option(0.1, 10);
        assert_eq!(part.training_points(), 1);
    }

    #[test]
    fn test_same_damage_type_charged_once() {
        let items = vec![weapon("Sword", "fire", 2), weapon("Axe", "fire", 2)];
        let charges = charged_parts(&items);
        assert_eq!(charges.len(), 1);
        assert_eq!(training_points_spent(&items), 4);
    }

    #[test]
    fn test_distinct_damage_types_charged_separately() {
        let items = vec![
            weapon("Sword", "fire", 2),
            weapon("Axe", "fire", 2),
            weapon("Mace", "cold", 2),
        ];
        assert_eq!(charged_parts(&items).len(), 2);
        assert_eq!(training_points_spent(&items), 8);
    }

    #[test]
    fn test_damage_type_match_ignores_case() {
        let items = vec![weapon("Sword", "Fire", 1), weapon("Axe", "fire ", 1)];
        assert_eq!(charged_parts(&items).len(), 1);
    }

    #[test]
    fn test_highest_option_level_wins() {
        let items = vec![weapon("Dagger", "fire", 1), weapon("Greatsword", "fire", 3)];
        let charges = charged_parts(&items);
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].item, "Greatsword");
        assert_eq!(charges[0].training_points, 5);
    }

    #[test]
    fn test_non_damage_parts_ignore_damage_type() {
        let items = vec![
            EquippedItem::new("Bolt", ItemKind::Power)
                .with_part(SelectedPart::new("Range", 1.0).with_damage_type("fire")),
            EquippedItem::new("Frost", ItemKind::Power)
                .with_part(SelectedPart::new("Range", 1.0).with_damage_type("cold")),
        ];
        assert_eq!(charged_parts(&items).len(), 1);
    }

    #[test]
    fn test_budget_goes_negative() {
        let mut creature = CreatureBuild::new("Drake", 1);
        for idx in 0..12 {
            creature.equip(
                EquippedItem::new(format!("Item {}", idx), ItemKind::Technique)
                    .with_part(SelectedPart::new(format!("Part {}", idx), 2.0)),
            );
        }
        let report = creature.training_points(&StandardFormulas::default());
        assert_eq!(report.total, 22);
        assert_eq!(report.spent, 24);
        assert_eq!(report.remaining, -2);
    }

    #[test]
    fn test_creature_ability_points() {
        let mut creature = CreatureBuild::new("Wolf", 1);
        creature.abilities.set(Ability::Agility, 3);
        creature.abilities.set(Ability::Intelligence, -2);
        assert_eq!(
            creature.ability_points_remaining(&StandardFormulas::default()),
            6
        );
    }

    #[test]
    fn test_defensive_traits_and_feats_survive_json() {
        let mut creature = CreatureBuild::new("Ice Wraith", 4);
        creature.resistances.push("piercing".into());
        creature.immunities.push("cold".into());
        creature
            .feats
            .add(crate::feat::Feat::new("Chilling Touch", crate::feat::FeatCategory::Archetype))
            .unwrap();
        creature.equip(weapon("Claw", "cold", 1));

        let json = serde_json::to_string(&creature).unwrap();
        let restored: CreatureBuild = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, creature);
        assert_eq!(restored.immunities, vec!["cold".to_string()]);
        assert_eq!(restored.feats.len(), 1);

        // Only the items are charged.
        let formulas = StandardFormulas::default();
        let bare = CreatureBuild {
            resistances: Vec::new(),
            immunities: Vec::new(),
            feats: FeatLedger::default(),
            ..restored.clone()
        };
        assert_eq!(
            restored.training_points(&formulas),
            bare.training_points(&formulas)
        );
    }
}
