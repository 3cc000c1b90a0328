//! Level-Up Walkthrough
//!
//! This example builds a character from a small catalog and takes it
//! through a session:
//! - Buying abilities, skills and defense bonuses
//! - Picking an archetype and checking feat prerequisites
//! - Reading derived stats and the budget summary
//! - Resting, then leveling up
//!
//! Run with `RUST_LOG=charsheet=debug` to see every recomputation.

use charsheet::catalog::CatalogRef;
use charsheet::feat::{unmet_requirements, SlotLimits};
use charsheet::*;

const CATALOG: &str = r#"{
    "skills": [
        { "id": 1, "name": "Athletics", "ability": "Strength" },
        { "id": 2, "name": "Climbing", "ability": "Strength", "base_skill_id": 1 },
        { "id": 3, "name": "Perception", "ability": "Acuity" }
    ],
    "feats": [
        { "id": 1, "name": "Power Attack", "category": "archetype",
          "ability_req": ["Strength"], "abil_req_val": [2] },
        { "id": 2, "name": "Cleave", "category": "archetype", "lvl_req": 2,
          "feat_req": "Power Attack" },
        { "id": 3, "name": "Second Wind", "uses_per_rec": 1, "rec_period": "partial" },
        { "id": 4, "name": "Second Wind II", "lvl_req": 2, "uses_per_rec": 2, "rec_period": "partial" }
    ]
}"#;

const SLOTS: SlotLimits = SlotLimits {
    archetype: 2,
    character: 1,
};

fn print_summary(build: &CharacterBuild, formulas: &StandardFormulas) {
    let stats = DerivedStats::compute(build, formulas);
    let budget = BudgetReport::compute(build, formulas, SLOTS);

    println!("  Level {}", build.level);
    for (ability, value) in build.abilities.iter() {
        println!("    {:<13} {:>3}", ability.name(), value);
    }
    for (defense, score) in &stats.defenses {
        println!("    {:<16} {:>3}", defense.name(), score);
    }
    println!(
        "    Health {} / Energy {} / Evasion {} / Speed {}",
        stats.max_health.value, stats.max_energy.value, stats.evasion, stats.speed
    );
    println!(
        "    Remaining: abilities {}, skills {}, proficiency {}, health/energy {}",
        budget.abilities.remaining(),
        budget.skills.remaining(),
        budget.proficiency.remaining(),
        budget.health_energy.remaining()
    );
    println!(
        "    Feat slots: archetype {}, character {}\n",
        budget.feat_slots.archetype_remaining(),
        budget.feat_slots.character_remaining()
    );
}

fn take_feat(build: &mut CharacterBuild, catalog: &InMemoryCatalog, name: &str) -> Result<(), SheetError> {
    let definition = catalog
        .find_feat(&CatalogRef::from(name))
        .ok_or_else(|| SheetError::UnknownFeat(name.to_string()))?;
    let unmet = unmet_requirements(definition, build);
    if !unmet.is_empty() {
        println!("  ✗ {} is not available yet: {:?}", name, unmet);
        return Ok(());
    }
    match build.feats.add(Feat::from_definition(definition))? {
        Some(replaced) => println!("  ✓ {} replaces {}", name, replaced.name),
        None => println!("  ✓ {} taken", name),
    }
    Ok(())
}

fn main() -> Result<(), SheetError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let catalog = InMemoryCatalog::from_json_str(CATALOG)?;
    let formulas = StandardFormulas::default();
    let graph = PrerequisiteGraph::from_definitions(catalog.feat_definitions());
    graph.detect_cycles()?;

    println!("=== Level-Up Walkthrough ===\n");

    // ===== Character Creation =====
    println!("1. Character Creation\n");

    let mut build = CharacterBuild::new(1);
    for _ in 0..3 {
        ability::increase(&mut build.abilities, Ability::Strength, build.level)?;
    }
    ability::increase(&mut build.abilities, Ability::Vitality, build.level)?;
    ability::increase(&mut build.abilities, Ability::Agility, build.level)?;
    ability::increase(&mut build.abilities, Ability::Acuity, build.level)?;
    ability::decrease(&mut build.abilities, Ability::Charisma)?;

    let check = ability::can_decrease(&build.abilities, Ability::Charisma);
    println!("  Charisma can go lower: {}", check.allowed);

    build.skills = catalog
        .skill_definitions()
        .iter()
        .map(|definition| definition.to_skill())
        .collect();
    if let Err(err) = skill::increase(&mut build.skills, SkillId(2)) {
        println!("  ✗ {}", err.reason());
    }
    skill::increase(&mut build.skills, SkillId(1))?;
    skill::increase(&mut build.skills, SkillId(1))?;
    skill::increase(&mut build.skills, SkillId(2))?;
    defense::increase(&mut build.defense_skills, Defense::Fortitude, build.level)?;

    build.archetype.change_kind(ArchetypeKind::Martial, build.level, false);
    build.archetype.martial_proficiency = 2;
    build.archetype.martial_ability = Some(Ability::Strength);
    build.allocation.health_points = 12;
    build.allocation.energy_points = 6;

    take_feat(&mut build, &catalog, "Power Attack")?;
    take_feat(&mut build, &catalog, "Cleave")?;
    take_feat(&mut build, &catalog, "Second Wind")?;

    let stats = DerivedStats::compute(&build, &formulas);
    stats.sync_pools(&mut build.pools);
    build.pools.health.fill();
    build.pools.energy.fill();
    print_summary(&build, &formulas);

    // ===== A Hard Fight =====
    println!("2. A Hard Fight, Then a Short Rest\n");

    build.pools.health.current -= 14;
    build.pools.energy.current -= 3;
    build.feats.use_feat(&CatalogRef::from("Second Wind"))?;

    let report = recovery::recover(
        RecoveryRequest::Partial {
            hours: 4,
            split: QuarterSplit::Automatic,
        },
        &mut build,
    )?;
    println!(
        "  {} quarters to health, {} to energy (+{} HP, +{} EN), {} uses restored",
        report.plan.health_quarters,
        report.plan.energy_quarters,
        report.plan.health_restored,
        report.plan.energy_restored,
        report.entries_reset
    );
    println!(
        "  Health {}/{}, Energy {}/{}\n",
        build.pools.health.current, build.pools.health.max, build.pools.energy.current, build.pools.energy.max
    );

    // ===== Level Up =====
    println!("3. Level Up\n");

    build.level = 2;
    ability::increase(&mut build.abilities, Ability::Strength, build.level)?;
    build.allocation.health_points += 8;
    build.allocation.energy_points += 4;

    println!(
        "  Still needed for Second Wind II: {:?}",
        graph.missing_for("Second Wind II", &build.feats)?
    );
    take_feat(&mut build, &catalog, "Cleave")?;
    take_feat(&mut build, &catalog, "Second Wind II")?;

    DerivedStats::compute(&build, &formulas).sync_pools(&mut build.pools);
    recovery::recover(RecoveryRequest::Full, &mut build)?;
    print_summary(&build, &formulas);

    Ok(())
}
