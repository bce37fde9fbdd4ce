//! Integration test: setup errors, iteration lifecycle and travel time

use spell_core::config::parse_spell_definitions;
use spell_core::outcome::always_hit;
use spell_core::prelude::*;
use spell_core::spell::MAX_SPELLS_PER_UNIT;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn roster() -> (Simulation, UnitIndex, UnitIndex) {
    let mut sim = Simulation::new(CombatConstants::default(), 11).with_rolls(FixedRolls::constant(0.5));
    let player = sim.add_unit(Unit::new(UnitIndex(0), "Player", UnitKind::Player, 80));
    let boss = sim.add_unit(Unit::new(UnitIndex(0), "Boss", UnitKind::Enemy, 83));
    sim.unit_mut(player).current_target = Some(boss);
    (sim, player, boss)
}

fn bolt(spell_id: u32) -> SpellDefinition {
    SpellDefinition {
        action_id: ActionId::spell(spell_id),
        school: School::Frost,
        proc_mask: ProcMask::SPELL_DAMAGE,
        damage_multiplier: 1.0,
        threat_multiplier: 1.0,
        ..Default::default()
    }
}

#[test]
fn test_spell_limit_per_unit() {
    let (mut sim, player, _) = roster();
    for spell_id in 0..MAX_SPELLS_PER_UNIT as u32 {
        sim.register_spell(player, bolt(spell_id)).unwrap();
    }

    let err = sim.register_spell(player, bolt(9999)).unwrap_err();
    assert!(matches!(err, SetupError::TooManySpells { limit: 100, .. }));
    assert_eq!(sim.unit(player).spellbook.len(), MAX_SPELLS_PER_UNIT);
}

#[test]
fn test_registration_errors() {
    let (mut sim, player, _) = roster();

    let mut def = bolt(1);
    def.proc_mask = ProcMask::empty();
    assert_eq!(
        sim.register_spell(player, def).unwrap_err(),
        SetupError::UnknownProcMask { action: ActionId::spell(1) }
    );

    let mut def = bolt(2);
    def.default_cast.cost = 400.0;
    assert!(matches!(
        sim.register_spell(player, def),
        Err(SetupError::CostWithoutResource { .. })
    ));

    let mut def = bolt(3);
    def.resource_type = Some(ResourceType::Mana);
    assert!(matches!(
        sim.register_spell(player, def),
        Err(SetupError::ResourceWithoutCost { .. })
    ));

    assert!(sim.unit(player).spellbook.is_empty());
}

#[test]
fn test_finalize_rejects_leaked_runtime_multiplier() {
    let (mut sim, player, _) = roster();
    let spell = sim.register_spell(player, bolt(1)).unwrap();
    sim.spell_mut(spell).cost_multiplier = 0.8;

    let err = sim.finalize().unwrap_err();
    assert_eq!(err.to_string(), "{SpellID: 1} has non-default cost_multiplier during finalize");
    assert!(!sim.is_finalized());
}

#[test]
fn test_reset_restores_dynamic_fields_and_zeroes_metrics() {
    let (mut sim, player, boss) = roster();
    let spell = sim.register_spell(player, bolt(1)).unwrap();
    sim.reset_iteration(1).unwrap();

    sim.spell_mut(spell).damage_multiplier *= 1.3;
    sim.spell_mut(spell).threat_multiplier = 0.0;
    sim.spell_mut(spell).cast_time_multiplier = 0.5;
    sim.calc_and_deal_damage(spell, boss, 100.0, always_hit);
    assert!((sim.spell(spell).target_metrics(boss).total_damage - 130.0).abs() < 1e-9);

    sim.reset_iteration(2).unwrap();
    let s = sim.spell(spell);
    assert!((s.damage_multiplier - 1.0).abs() < f64::EPSILON);
    assert!((s.threat_multiplier - 1.0).abs() < f64::EPSILON);
    assert!((s.cast_time_multiplier - 1.0).abs() < f64::EPSILON);
    assert_eq!(s.target_metrics(boss), SpellMetrics::default());
}

#[test]
fn test_done_iteration_aggregates_per_unit() {
    let (mut sim, player, boss) = roster();
    let counted = sim.register_spell(player, bolt(1)).unwrap();
    let mut hidden = bolt(2);
    hidden.flags = SpellFlags::NO_METRICS;
    let hidden = sim.register_spell(player, hidden).unwrap();

    for seed in 0..3 {
        sim.reset_iteration(seed).unwrap();
        sim.calc_and_deal_damage(counted, boss, 100.0, always_hit);
        sim.calc_and_deal_damage(hidden, boss, 100.0, always_hit);
        sim.done_iteration();
    }

    let metrics = &sim.unit(player).metrics;
    assert_eq!(metrics.iterations, 3);
    assert!((metrics.average_damage(ActionId::spell(1)) - 100.0).abs() < 1e-9);
    assert!(metrics.action(ActionId::spell(2)).is_none());

    let action = metrics.action(ActionId::spell(1)).unwrap();
    assert_eq!(action.targets[boss.0].hits, 3);
}

#[test]
fn test_missile_lands_after_travel_time() {
    let (mut sim, player, boss) = roster();
    sim.unit_mut(player).distance_from_target = 30.0;

    let mut def = bolt(42842);
    def.missile_speed = 20.0;
    let config = SpellConfig::new(def).with_effects(|sim: &mut Simulation, spell: SpellId, target: UnitIndex| {
        let id = sim.calc_damage(spell, target, 500.0, always_hit);
        sim.wait_travel_time(spell, move |sim: &mut Simulation| {
            sim.deal_damage(spell, id);
        });
    });
    let spell = sim.register_spell(player, config).unwrap();
    sim.reset_iteration(5).unwrap();

    sim.cast(spell, None);
    assert_eq!(sim.spell(spell).results_in_use(), 1);

    sim.run_until(Duration::from_secs(1));
    assert!((sim.spell(spell).target_metrics(boss).total_damage - 0.0).abs() < f64::EPSILON);

    sim.run_until(Duration::from_secs(2));
    assert!((sim.spell(spell).target_metrics(boss).total_damage - 500.0).abs() < 1e-9);
    assert_eq!(sim.spell(spell).results_in_use(), 0);
}

#[test]
fn test_same_time_actions_run_in_schedule_order() {
    let (mut sim, _, _) = roster();
    let order = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let sink = Arc::clone(&order);
        sim.schedule(Duration::from_secs(1), move |_: &mut Simulation| {
            sink.lock().unwrap().push(label);
        });
    }
    sim.run_until(Duration::from_secs(1));

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_loaded_definitions_register() {
    let toml = r#"
[[spells]]
action_id = { spell_id = 47809 }
school = "shadow"
proc_mask = "SPELL_DAMAGE"
damage_multiplier = 1.15
crit_multiplier = 2.0
threat_multiplier = 1.0

[[spells]]
action_id = { spell_id = 48461 }
school = "nature"
proc_mask = "SPELL_DAMAGE"
resource_type = "mana"
default_cast = { cost = 350.0, cast_time = 2.5 }
damage_multiplier = 1.0
"#;
    let (mut sim, player, boss) = roster();
    for def in parse_spell_definitions(toml).unwrap() {
        sim.register_spell(player, def).unwrap();
    }
    sim.reset_iteration(1).unwrap();

    let wrath = sim.get_spell(player, ActionId::spell(48461)).unwrap();
    sim.cast(wrath, None);
    assert_eq!(
        sim.spell(wrath).target_metrics(boss).total_cast_time,
        Duration::from_millis(2500)
    );
}
