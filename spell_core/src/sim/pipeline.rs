//! Calc/deal pipeline
//!
//! `calc_*` computes a result and checks it out of the spell's pool. The
//! only visible side effects are the pool slot and the rolls drawn.
//! `deal_*` is the only place that touches metrics, threat, health, the log
//! and reaction hooks, and it returns the slot when done.
//!
//! Damage stages, in order:
//! 1. attacker multiplier (live, or a periodic snapshot)
//! 2. target bonus damage and target multipliers
//! 3. armor / partial resist
//! 4. outcome applier
//! 5. target damage-taken modifiers, then clamp at zero

use super::{DealEntry, PipelineTrace, Simulation};
use crate::defense::apply_resistances;
use crate::outcome::{OutcomeApplier, OutcomeContext};
use crate::spell::{ResultId, SpellResult};
use crate::types::{SpellId, UnitIndex};
use crate::unit::ReactionKind;

impl Simulation {
    // --- Multipliers ---

    /// Live attacker-side damage multiplier for `spell` against `target`
    pub fn attacker_damage_multiplier(&self, spell: SpellId, target: UnitIndex) -> f64 {
        let s = &self.spells[spell.0];
        let table = self.tables.get(s.unit, target);
        s.attacker_damage_multiplier(&self.units[s.unit.0], table)
    }

    /// Live caster-side healing multiplier
    pub fn caster_healing_multiplier(&self, spell: SpellId) -> f64 {
        let s = &self.spells[spell.0];
        s.caster_healing_multiplier(&self.units[s.unit.0])
    }

    // --- Results ---

    pub fn result(&self, spell: SpellId, id: ResultId) -> &SpellResult {
        self.spells[spell.0].results.get(id)
    }

    /// Adjust a result between calc and deal
    pub fn result_mut(&mut self, spell: SpellId, id: ResultId) -> &mut SpellResult {
        self.spells[spell.0].results.get_mut(id)
    }

    // --- Calc ---

    /// Roll an outcome with no damage attached
    pub fn calc_outcome(&mut self, spell: SpellId, target: UnitIndex, applier: OutcomeApplier) -> ResultId {
        let Simulation {
            units,
            spells,
            tables,
            constants,
            rolls,
            ..
        } = self;
        let s = &spells[spell.0];
        let mut result = SpellResult::new(target, 0.0);

        let mut ctx = OutcomeContext {
            spell: s,
            attacker: &units[s.unit.0],
            defender: &units[target.0],
            table: tables.get(s.unit, target),
            constants,
            rolls: &mut **rolls,
        };
        applier(&mut ctx, &mut result);

        spells[spell.0].results.acquire(result)
    }

    pub fn calc_damage(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_damage: f64,
        applier: OutcomeApplier,
    ) -> ResultId {
        let multiplier = self.attacker_damage_multiplier(spell, target);
        self.calc_damage_internal(spell, target, base_damage, multiplier, false, applier)
    }

    /// Periodic damage with a live attacker multiplier. Snapshotted ticks
    /// go through [`crate::dot::Dot`] instead.
    pub fn calc_periodic_damage(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_damage: f64,
        applier: OutcomeApplier,
    ) -> ResultId {
        let multiplier = self.attacker_damage_multiplier(spell, target);
        self.calc_damage_internal(spell, target, base_damage, multiplier, true, applier)
    }

    /// Damage stages 1-5 with the attacker multiplier supplied by the caller
    pub(crate) fn calc_damage_internal(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_damage: f64,
        attacker_multiplier: f64,
        periodic: bool,
        applier: OutcomeApplier,
    ) -> ResultId {
        let at = self.timeline.now();
        let Simulation {
            units,
            spells,
            tables,
            constants,
            rolls,
            log,
            ..
        } = self;
        let s = &spells[spell.0];
        let table = tables.get(s.unit, target);
        let mut result = SpellResult::new(target, base_damage);

        // Stage 1
        result.damage *= attacker_multiplier;
        let after_attacker = result.damage;

        // Stage 2
        let defender = &units[target.0];
        result.damage += s.target_bonus_damage(defender);
        result.damage *= s.target_damage_multiplier(defender, table, periodic);
        let after_target = result.damage;

        // Stages 3 and 4
        let mut ctx = OutcomeContext {
            spell: s,
            attacker: &units[s.unit.0],
            defender,
            table,
            constants,
            rolls: &mut **rolls,
        };
        apply_resistances(&mut ctx, &mut result, periodic);
        let after_resistance = result.damage;

        result.pre_outcome_damage = result.damage;
        applier(&mut ctx, &mut result);
        let after_outcome = result.damage;

        // Stage 5
        for modifier in units[target.0].dynamic_damage_taken_modifiers.iter_mut() {
            modifier(s, &mut result);
        }
        result.damage = result.damage.max(0.0);

        if let Some(log) = log.as_mut().filter(|_| s.logs_enabled()) {
            log.record_trace(PipelineTrace {
                at,
                action: s.action_id,
                attacker: s.unit,
                target,
                healing: false,
                base: base_damage,
                after_attacker,
                after_target,
                after_resistance,
                after_outcome,
                after_post_outcome: result.damage,
            });
        }

        spells[spell.0].results.acquire(result)
    }

    pub fn calc_healing(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_healing: f64,
        applier: OutcomeApplier,
    ) -> ResultId {
        let multiplier = self.caster_healing_multiplier(spell);
        self.calc_healing_internal(spell, target, base_healing, multiplier, applier)
    }

    /// Healing: caster multiplier, target multiplier, outcome. No
    /// resistance and no modifier loop.
    pub(crate) fn calc_healing_internal(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_healing: f64,
        caster_multiplier: f64,
        applier: OutcomeApplier,
    ) -> ResultId {
        let at = self.timeline.now();
        let Simulation {
            units,
            spells,
            tables,
            constants,
            rolls,
            log,
            ..
        } = self;
        let s = &spells[spell.0];
        let table = tables.get(s.unit, target);
        let defender = &units[target.0];
        let mut result = SpellResult::new(target, base_healing);

        result.damage *= caster_multiplier;
        let after_attacker = result.damage;
        result.damage *= s.target_healing_multiplier(defender, table);
        let after_target = result.damage;

        result.pre_outcome_damage = result.damage;
        let mut ctx = OutcomeContext {
            spell: s,
            attacker: &units[s.unit.0],
            defender,
            table,
            constants,
            rolls: &mut **rolls,
        };
        applier(&mut ctx, &mut result);

        if let Some(log) = log.as_mut().filter(|_| s.logs_enabled()) {
            log.record_trace(PipelineTrace {
                at,
                action: s.action_id,
                attacker: s.unit,
                target,
                healing: true,
                base: base_healing,
                after_attacker,
                after_target,
                after_resistance: after_target,
                after_outcome: result.damage,
                after_post_outcome: result.damage,
            });
        }

        spells[spell.0].results.acquire(result)
    }

    // --- Deal ---

    pub fn deal_damage(&mut self, spell: SpellId, id: ResultId) -> SpellResult {
        self.deal(spell, id, false, false)
    }

    pub fn deal_periodic_damage(&mut self, spell: SpellId, id: ResultId) -> SpellResult {
        self.deal(spell, id, false, true)
    }

    /// Deal a result from [`Simulation::calc_outcome`]. Counted and hooked
    /// like a direct hit.
    pub fn deal_outcome(&mut self, spell: SpellId, id: ResultId) -> SpellResult {
        self.deal(spell, id, false, false)
    }

    pub fn deal_healing(&mut self, spell: SpellId, id: ResultId) -> SpellResult {
        self.deal(spell, id, true, false)
    }

    pub fn deal_periodic_healing(&mut self, spell: SpellId, id: ResultId) -> SpellResult {
        self.deal(spell, id, true, true)
    }

    /// Metrics and threat, encounter totals, health, log, then hooks
    /// (attacker's dealt list before the target's taken list). The slot is
    /// released last.
    fn deal(&mut self, spell: SpellId, id: ResultId, healing: bool, periodic: bool) -> SpellResult {
        let result = *self.spells[spell.0].results.get(id);
        let target = result.target;
        let owner = self.spells[spell.0].unit;
        let threat = result.calc_threat(
            &self.spells[spell.0],
            self.units[owner.0].pseudo.threat_multiplier,
        );

        let metrics = self.spells[spell.0].metrics_mut(target);
        if healing {
            metrics.total_healing += result.damage;
        } else {
            metrics.total_damage += result.damage;
        }
        metrics.total_threat += threat;
        metrics.record_outcome(result.outcome);

        let defender = &mut self.units[target.0];
        if healing {
            if let Some(health) = defender.health.as_mut() {
                health.gain(result.damage);
            }
        } else {
            if defender.is_enemy() {
                self.encounter.damage_taken += result.damage;
            }
            if let Some(health) = defender.health.as_mut() {
                health.remove(result.damage);
            }
        }

        let at = self.timeline.now();
        if let Some(log) = self.log.as_mut() {
            let s = &self.spells[spell.0];
            if s.logs_enabled() {
                log.record_deal(DealEntry {
                    at,
                    action: s.action_id,
                    attacker: owner,
                    target_label: self.units[target.0].log_label(),
                    periodic,
                    healing,
                    result,
                    threat,
                });
            }
        }

        let (dealt, taken) = ReactionKind::pair(healing, periodic);
        self.fire_reactions(owner, dealt, spell, &result);
        self.fire_reactions(target, taken, spell, &result);

        self.spells[spell.0].results.release(id)
    }

    /// Run one unit's handlers for `kind` in registration order. Handlers
    /// registered while firing run too.
    fn fire_reactions(&mut self, unit: UnitIndex, kind: ReactionKind, spell: SpellId, result: &SpellResult) {
        let mut i = 0;
        while let Some(handler) = self.units[unit.0].reactions.handlers(kind).get(i).cloned() {
            handler(self, spell, result);
            i += 1;
        }
    }

    // --- Calc and deal ---

    pub fn calc_and_deal_damage(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_damage: f64,
        applier: OutcomeApplier,
    ) -> SpellResult {
        let id = self.calc_damage(spell, target, base_damage, applier);
        self.deal_damage(spell, id)
    }

    pub fn calc_and_deal_periodic_damage(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_damage: f64,
        applier: OutcomeApplier,
    ) -> SpellResult {
        let id = self.calc_periodic_damage(spell, target, base_damage, applier);
        self.deal_periodic_damage(spell, id)
    }

    pub fn calc_and_deal_outcome(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        applier: OutcomeApplier,
    ) -> SpellResult {
        let id = self.calc_outcome(spell, target, applier);
        self.deal_outcome(spell, id)
    }

    pub fn calc_and_deal_healing(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_healing: f64,
        applier: OutcomeApplier,
    ) -> SpellResult {
        let id = self.calc_healing(spell, target, base_healing, applier);
        self.deal_healing(spell, id)
    }

    pub fn calc_and_deal_periodic_healing(
        &mut self,
        spell: SpellId,
        target: UnitIndex,
        base_healing: f64,
        applier: OutcomeApplier,
    ) -> SpellResult {
        let id = self.calc_healing(spell, target, base_healing, applier);
        self.deal_periodic_healing(spell, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConstants;
    use crate::outcome::{always_hit, HitOutcome};
    use crate::roll::FixedRolls;
    use crate::spell::{ProcMask, Spell, SpellDefinition};
    use crate::types::{ActionId, School, UnitKind};
    use crate::unit::Unit;

    fn setup(school: School) -> (Simulation, SpellId, UnitIndex) {
        let mut sim = Simulation::new(CombatConstants::default(), 0).with_rolls(FixedRolls::constant(0.5));
        let player = sim.add_unit(Unit::new(UnitIndex(0), "Player", UnitKind::Player, 80));
        let boss = sim.add_unit(Unit::new(UnitIndex(0), "Boss", UnitKind::Enemy, 83).with_health(10_000.0));
        let def = SpellDefinition {
            action_id: ActionId::spell(1),
            school,
            proc_mask: ProcMask::SPELL_DAMAGE,
            damage_multiplier: 1.0,
            threat_multiplier: 1.0,
            ..Default::default()
        };
        let spell = sim.register_spell(player, def).unwrap();
        sim.finalize().unwrap();
        (sim, spell, boss)
    }

    #[test]
    fn test_calc_has_no_side_effects_until_deal() {
        let (mut sim, spell, boss) = setup(School::Fire);
        let id = sim.calc_damage(spell, boss, 100.0, always_hit);

        assert_eq!(sim.spell(spell).results_in_use(), 1);
        assert_eq!(sim.spell(spell).target_metrics(boss).hits, 0);
        assert!((sim.encounter.damage_taken - 0.0).abs() < f64::EPSILON);

        let result = sim.deal_damage(spell, id);
        assert_eq!(result.outcome, HitOutcome::HIT);
        assert_eq!(sim.spell(spell).results_in_use(), 0);
        assert_eq!(sim.spell(spell).target_metrics(boss).hits, 1);
        assert!((sim.encounter.damage_taken - 100.0).abs() < f64::EPSILON);
        assert_eq!(sim.unit(boss).health.map(|h| h.current_health), Some(9_900.0));
    }

    #[test]
    fn test_result_mut_between_calc_and_deal() {
        let (mut sim, spell, boss) = setup(School::Fire);
        let id = sim.calc_damage(spell, boss, 100.0, always_hit);
        sim.result_mut(spell, id).damage = 40.0;
        assert!((sim.result(spell, id).damage - 40.0).abs() < f64::EPSILON);

        let result = sim.deal_damage(spell, id);
        assert!((result.damage - 40.0).abs() < f64::EPSILON);
        assert!((sim.spell(spell).target_metrics(boss).total_damage - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_healing_skips_resistance_and_clamp() {
        let (mut sim, spell, boss) = setup(School::Holy);
        sim.unit_mut(boss).pseudo.healing_taken_multiplier = 1.5;
        if let Some(health) = sim.unit_mut(boss).health.as_mut() {
            health.remove(500.0);
        }

        let result = sim.calc_and_deal_healing(spell, boss, 200.0, always_hit);
        assert!((result.damage - 300.0).abs() < f64::EPSILON);
        assert!((sim.spell(spell).target_metrics(boss).total_healing - 300.0).abs() < f64::EPSILON);
        assert!((sim.spell(spell).target_metrics(boss).total_damage - 0.0).abs() < f64::EPSILON);
        assert_eq!(sim.unit(boss).health.map(|h| h.current_health), Some(9_800.0));
    }

    #[test]
    fn test_outcome_only() {
        let (mut sim, spell, boss) = setup(School::Arcane);
        let result = sim.calc_and_deal_outcome(spell, boss, always_hit);
        assert!(result.landed());
        assert!((result.damage - 0.0).abs() < f64::EPSILON);
        assert_eq!(sim.spell(spell).target_metrics(boss).hits, 1);
    }

    #[test]
    fn test_trace_records_each_stage() {
        let (mut sim, spell, boss) = setup(School::Arcane);
        sim.enable_log();
        sim.spell_mut(spell).damage_multiplier = 2.0;
        sim.unit_mut(boss).pseudo.damage_taken_multiplier = 1.5;
        sim.unit_mut(boss).add_damage_taken_modifier(Box::new(|_: &Spell, result: &mut SpellResult| {
            result.damage -= 1000.0
        }));

        let result = sim.calc_and_deal_damage(spell, boss, 100.0, always_hit);
        assert!((result.damage - 0.0).abs() < f64::EPSILON);

        let log = sim.log().unwrap();
        let trace = &log.traces[0];
        assert!((trace.after_attacker - 200.0).abs() < f64::EPSILON);
        assert!((trace.after_target - 300.0).abs() < f64::EPSILON);
        assert!((trace.after_resistance - 300.0).abs() < f64::EPSILON);
        assert!((trace.after_outcome - 300.0).abs() < f64::EPSILON);
        assert!((trace.after_post_outcome - 0.0).abs() < f64::EPSILON);
        assert_eq!(log.deals.len(), 1);
    }
}
