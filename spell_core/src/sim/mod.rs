//! Simulation - the arena that owns every unit, spell and attack table
//!
//! One `Simulation` is one independent trial. Nothing in it is shared, so
//! parallel trials each build their own. Spells and units are addressed by
//! index ([`SpellId`], [`UnitIndex`]) rather than by reference so hooks can
//! take `&mut Simulation` and cast again.
//!
//! Lifecycle:
//! 1. `add_unit` / `register_spell` during setup
//! 2. `finalize` once, capturing every spell's static values
//! 3. per iteration: `reset_iteration`, casts and `run_until`, `done_iteration`

mod log;
mod pipeline;
mod timeline;

pub use log::{CombatLog, DealEntry, LogLine, PipelineTrace};
pub use timeline::{ActionQueue, DelayedAction, Timeline};

use crate::attack_table::{AttackTable, AttackTables};
use crate::config::CombatConstants;
use crate::dot::{ActiveDots, Dot};
use crate::error::SetupError;
use crate::roll::{RollPurpose, RollSource, SimRng};
use crate::spell::{Spell, SpellConfig, SpellFlags, MAX_SPELLS_PER_UNIT};
use crate::types::{ActionId, SpellId, UnitIndex};
use crate::unit::Unit;
use std::time::Duration;
use tracing::{debug, trace};

/// Encounter-wide totals for one iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encounter {
    /// Damage dealt to enemy units
    pub damage_taken: f64,
}

pub struct Simulation {
    units: Vec<Unit>,
    spells: Vec<Spell>,
    tables: AttackTables,
    constants: CombatConstants,
    rolls: Box<dyn RollSource>,
    timeline: Box<dyn Timeline>,
    dots: ActiveDots,
    pub encounter: Encounter,
    log: Option<CombatLog>,
    finalized: bool,
    seed: u64,
}

impl Simulation {
    /// Create an empty simulation with seeded rolls and the default timeline
    pub fn new(constants: CombatConstants, seed: u64) -> Self {
        Simulation {
            units: Vec::new(),
            spells: Vec::new(),
            tables: AttackTables::default(),
            constants,
            rolls: Box::new(SimRng::new(seed)),
            timeline: Box::new(ActionQueue::new()),
            dots: ActiveDots::new(),
            encounter: Encounter::default(),
            log: None,
            finalized: false,
            seed,
        }
    }

    /// Replace the roll source, e.g. with scripted rolls in tests
    pub fn with_rolls(mut self, rolls: impl RollSource + 'static) -> Self {
        self.rolls = Box::new(rolls);
        self
    }

    pub fn with_timeline(mut self, timeline: impl Timeline + 'static) -> Self {
        self.timeline = Box::new(timeline);
        self
    }

    /// Record pipeline traces and deal lines from now on
    pub fn enable_log(&mut self) {
        if self.log.is_none() {
            self.log = Some(CombatLog::new());
        }
    }

    pub fn log(&self) -> Option<&CombatLog> {
        self.log.as_ref()
    }

    // --- Roster ---

    /// Add a unit to the roster. The unit's index is assigned here and
    /// attack tables are rebuilt for the new roster.
    pub fn add_unit(&mut self, mut unit: Unit) -> UnitIndex {
        let index = UnitIndex(self.units.len());
        unit.index = index;
        self.units.push(unit);
        self.tables.rebuild(&self.units, &self.constants);

        let num_units = self.units.len();
        for spell in &mut self.spells {
            spell.ensure_metrics(num_units);
        }
        index
    }

    pub fn unit(&self, index: UnitIndex) -> &Unit {
        &self.units[index.0]
    }

    pub fn unit_mut(&mut self, index: UnitIndex) -> &mut Unit {
        &mut self.units[index.0]
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn attack_table(&self, attacker: UnitIndex, defender: UnitIndex) -> &AttackTable {
        self.tables.get(attacker, defender)
    }

    /// Debuffs on a defender write their multipliers here
    pub fn attack_table_mut(&mut self, attacker: UnitIndex, defender: UnitIndex) -> &mut AttackTable {
        self.tables.get_mut(attacker, defender)
    }

    pub fn constants(&self) -> &CombatConstants {
        &self.constants
    }

    // --- Spells ---

    /// Validate a spell config and add the spell to `unit`'s spellbook.
    ///
    /// The unit's spell-registered handlers run on the new spell in order.
    /// Registering after `finalize` finalizes the spell immediately.
    pub fn register_spell(
        &mut self,
        unit: UnitIndex,
        config: impl Into<SpellConfig>,
    ) -> Result<SpellId, SetupError> {
        let config = config.into();
        let action = config.definition.action_id;
        let num_units = self.units.len();
        let owner = self.units.get_mut(unit.0).ok_or(SetupError::UnknownUnit(unit))?;

        if owner.spellbook.len() >= MAX_SPELLS_PER_UNIT {
            return Err(SetupError::TooManySpells {
                unit,
                action,
                limit: MAX_SPELLS_PER_UNIT,
            });
        }

        let id = SpellId(self.spells.len());
        let mut spell = Spell::from_config(id, unit, config)?;
        for handler in owner.spell_registered_handlers.iter_mut() {
            handler(&mut spell);
        }
        if self.finalized {
            spell.finalize()?;
            spell.reset(num_units);
        } else {
            spell.ensure_metrics(num_units);
        }

        debug!(unit = unit.0, action = %action, spell = id.0, "registered spell");
        owner.spellbook.push(id);
        self.spells.push(spell);
        Ok(id)
    }

    /// Run `handler` on every spell `unit` already owns and on every spell
    /// registered to it later
    pub fn on_spell_registered(
        &mut self,
        unit: UnitIndex,
        mut handler: impl FnMut(&mut Spell) + Send + 'static,
    ) -> Result<(), SetupError> {
        let Simulation { units, spells, .. } = self;
        let owner = units.get_mut(unit.0).ok_or(SetupError::UnknownUnit(unit))?;
        for id in &owner.spellbook {
            handler(&mut spells[id.0]);
        }
        owner.spell_registered_handlers.push(Box::new(handler));
        Ok(())
    }

    /// Spell owned by `unit` with exactly this action id
    pub fn get_spell(&self, unit: UnitIndex, action: ActionId) -> Option<SpellId> {
        self.units
            .get(unit.0)?
            .spellbook
            .iter()
            .copied()
            .find(|id| self.spells[id.0].action_id.same_action(action))
    }

    pub fn get_or_register_spell(
        &mut self,
        unit: UnitIndex,
        config: impl Into<SpellConfig>,
    ) -> Result<SpellId, SetupError> {
        let config = config.into();
        match self.get_spell(unit, config.definition.action_id) {
            Some(id) => Ok(id),
            None => self.register_spell(unit, config),
        }
    }

    pub fn spell(&self, id: SpellId) -> &Spell {
        &self.spells[id.0]
    }

    pub fn spell_mut(&mut self, id: SpellId) -> &mut Spell {
        &mut self.spells[id.0]
    }

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    // --- Iteration lifecycle ---

    /// Capture every spell's static values. Fails if a runtime-only
    /// multiplier was changed during setup.
    pub fn finalize(&mut self) -> Result<(), SetupError> {
        if self.finalized {
            return Ok(());
        }
        let num_units = self.units.len();
        for spell in &mut self.spells {
            spell.finalize()?;
            spell.reset(num_units);
        }
        self.finalized = true;
        debug!(units = num_units, spells = self.spells.len(), "simulation finalized");
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Start a new iteration: reseed the rolls, empty the timeline and
    /// restore every spell and unit to its finalized state
    pub fn reset_iteration(&mut self, seed: u64) -> Result<(), SetupError> {
        self.finalize()?;

        self.seed = seed;
        self.rolls.reseed(seed);
        self.timeline.clear();
        self.dots.clear();
        self.encounter = Encounter::default();

        let num_units = self.units.len();
        for spell in &mut self.spells {
            spell.reset(num_units);
        }
        for unit in &mut self.units {
            if let Some(health) = unit.health.as_mut() {
                health.reset();
            }
        }
        if let Some(log) = self.log.as_mut() {
            log.clear();
        }
        trace!(seed, "iteration reset");
        Ok(())
    }

    /// Fold this iteration's spell metrics into each owner's aggregate
    pub fn done_iteration(&mut self) {
        let Simulation { units, spells, .. } = self;
        for spell in spells.iter() {
            if spell.flags.matches(SpellFlags::NO_METRICS) {
                continue;
            }
            units[spell.unit.0].metrics.add_spell(spell);
        }
        for unit in units.iter_mut() {
            unit.metrics.done_iteration();
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform sample in [0, 1) from the stream for `purpose`
    pub fn roll(&mut self, purpose: RollPurpose) -> f64 {
        self.rolls.roll(purpose)
    }

    // --- Casting ---

    /// Target used when a cast names none: the owner's current target,
    /// else the owner itself
    pub fn default_target(&self, spell: SpellId) -> UnitIndex {
        let owner = &self.units[self.spells[spell.0].unit.0];
        owner.current_target.unwrap_or(owner.index)
    }

    /// Cast a spell: record its cast time, then apply its effects
    pub fn cast(&mut self, spell: SpellId, target: Option<UnitIndex>) {
        let target = target.unwrap_or_else(|| self.default_target(spell));
        let num_units = self.units.len();
        let now = self.now();

        let s = &mut self.spells[spell.0];
        s.ensure_metrics(num_units);
        let cast_time = s.default_cast.cast_duration().mul_f64(s.cast_time_multiplier.max(0.0));
        s.metrics_mut(target).total_cast_time += cast_time;

        if let Some(log) = self.log.as_mut() {
            let s = &self.spells[spell.0];
            if s.logs_enabled() {
                let message = format!(
                    "Casting {} on {} (Cast Time: {:.3}s)",
                    s.action_id,
                    self.units[target.0].log_label(),
                    cast_time.as_secs_f64()
                );
                log.record_line(now, s.unit, message);
            }
        }

        self.skip_cast_and_apply_effects(spell, Some(target));
    }

    /// Apply a spell's effects without a cast. Still counts as a cast
    /// against the target.
    pub fn skip_cast_and_apply_effects(&mut self, spell: SpellId, target: Option<UnitIndex>) {
        let target = target.unwrap_or_else(|| self.default_target(spell));
        let num_units = self.units.len();

        let s = &mut self.spells[spell.0];
        s.ensure_metrics(num_units);
        s.metrics_mut(target).casts += 1;

        let effects = s.apply_effects.clone();
        if let Some(effects) = effects {
            effects.call(self, spell, target);
        }
    }

    // --- Threat ---

    /// Add threat against every opponent of the spell's owner, scaled by
    /// the owner's threat multiplier
    pub fn apply_aoe_threat(&mut self, spell: SpellId, amount: f64) {
        let owner = self.spells[spell.0].unit;
        let multiplier = self.units[owner.0].pseudo.threat_multiplier;
        self.apply_aoe_threat_ignore_multipliers(spell, amount * multiplier);
    }

    pub fn apply_aoe_threat_ignore_multipliers(&mut self, spell: SpellId, amount: f64) {
        let Simulation { units, spells, .. } = self;
        let s = &mut spells[spell.0];
        let owner = &units[s.unit.0];
        for unit in units.iter().filter(|u| u.is_opponent_of(owner)) {
            s.metrics_mut(unit.index).total_threat += amount;
        }
    }

    /// This iteration's damage per cast against the owner's opponents
    pub fn cur_damage_per_cast(&self, spell: SpellId) -> f64 {
        let s = &self.spells[spell.0];
        let owner = &self.units[s.unit.0];

        let (damage, casts) = self
            .units
            .iter()
            .filter(|u| u.is_opponent_of(owner))
            .map(|u| s.target_metrics(u.index))
            .fold((0.0, 0u32), |(damage, casts), m| {
                (damage + m.total_damage, casts + m.casts)
            });

        if casts == 0 {
            0.0
        } else {
            damage / casts as f64
        }
    }

    // --- Time ---

    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Run `action` at an absolute simulated time
    pub fn schedule(&mut self, at: Duration, action: impl FnOnce(&mut Simulation) + Send + 'static) {
        self.timeline.schedule(at, Box::new(action));
    }

    /// Run `callback` once the spell's missile reaches the owner's target
    pub fn wait_travel_time(
        &mut self,
        spell: SpellId,
        callback: impl FnOnce(&mut Simulation) + Send + 'static,
    ) {
        let s = &self.spells[spell.0];
        let distance = self.units[s.unit.0].distance_from_target;
        let at = self.now() + s.travel_time(distance);
        self.schedule(at, callback);
    }

    /// Run every scheduled action due at or before `end`, in time order,
    /// then leave the clock at `end`
    pub fn run_until(&mut self, end: Duration) {
        while let Some((at, action)) = self.timeline.pop_due(end) {
            self.timeline.advance_to(at);
            action(self);
        }
        self.timeline.advance_to(end);
    }

    pub fn pending_actions(&self) -> usize {
        self.timeline.pending()
    }

    // --- Periodic effects ---

    /// The periodic effect `spell` currently has ticking on `target`
    pub fn active_dot(&self, spell: SpellId, target: UnitIndex) -> Option<&Dot> {
        self.dots.get(spell, target)
    }

    pub fn active_dots(&self) -> &ActiveDots {
        &self.dots
    }

    pub(crate) fn active_dots_mut(&mut self) -> &mut ActiveDots {
        &mut self.dots
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("units", &self.units.len())
            .field("spells", &self.spells.len())
            .field("now", &self.now())
            .field("pending", &self.timeline.pending())
            .field("active_dots", &self.dots.len())
            .field("encounter", &self.encounter)
            .field("finalized", &self.finalized)
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::{ProcMask, SpellDefinition};
    use crate::types::UnitKind;
    use std::sync::{Arc, Mutex};

    fn definition(spell_id: u32) -> SpellDefinition {
        SpellDefinition {
            action_id: ActionId::spell(spell_id),
            proc_mask: ProcMask::SPELL_DAMAGE,
            damage_multiplier: 1.0,
            threat_multiplier: 1.0,
            ..Default::default()
        }
    }

    fn two_unit_sim() -> (Simulation, UnitIndex, UnitIndex) {
        let mut sim = Simulation::new(CombatConstants::default(), 1);
        let player = sim.add_unit(Unit::new(UnitIndex(0), "Player", UnitKind::Player, 80));
        let boss = sim.add_unit(Unit::new(UnitIndex(0), "Boss", UnitKind::Enemy, 83));
        sim.unit_mut(player).current_target = Some(boss);
        (sim, player, boss)
    }

    #[test]
    fn test_add_unit_assigns_indices() {
        let (sim, player, boss) = two_unit_sim();
        assert_eq!(player, UnitIndex(0));
        assert_eq!(boss, UnitIndex(1));
        assert_eq!(sim.unit(boss).index, boss);
        assert_eq!(sim.attack_table(player, boss).defender, boss);
    }

    #[test]
    fn test_register_and_lookup() {
        let (mut sim, player, boss) = two_unit_sim();
        let id = sim.register_spell(player, definition(10)).unwrap();

        assert_eq!(sim.get_spell(player, ActionId::spell(10)), Some(id));
        assert_eq!(sim.get_spell(boss, ActionId::spell(10)), None);
        assert_eq!(sim.get_or_register_spell(player, definition(10)).unwrap(), id);
        assert_eq!(sim.unit(player).spellbook, vec![id]);
    }

    #[test]
    fn test_register_on_unknown_unit() {
        let (mut sim, _, _) = two_unit_sim();
        let err = sim.register_spell(UnitIndex(9), definition(1)).unwrap_err();
        assert_eq!(err, SetupError::UnknownUnit(UnitIndex(9)));
    }

    #[test]
    fn test_spell_registered_handlers_see_old_and_new_spells() {
        let (mut sim, player, _) = two_unit_sim();
        let early = sim.register_spell(player, definition(1)).unwrap();
        sim.on_spell_registered(player, |spell: &mut Spell| spell.bonus_crit_rating += 45.0)
            .unwrap();
        let late = sim.register_spell(player, definition(2)).unwrap();

        assert!((sim.spell(early).bonus_crit_rating - 45.0).abs() < f64::EPSILON);
        assert!((sim.spell(late).bonus_crit_rating - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_register_after_finalize_is_finalized() {
        let (mut sim, player, boss) = two_unit_sim();
        sim.finalize().unwrap();
        let id = sim.register_spell(player, definition(3)).unwrap();

        sim.spell_mut(id).damage_multiplier = 5.0;
        sim.reset_iteration(2).unwrap();
        assert!((sim.spell(id).damage_multiplier - 1.0).abs() < f64::EPSILON);
        assert_eq!(sim.spell(id).target_metrics(boss).casts, 0);
    }

    #[test]
    fn test_skip_cast_counts_and_runs_effects() {
        let (mut sim, player, boss) = two_unit_sim();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = SpellConfig::new(definition(4)).with_effects(move |_: &mut Simulation, _: SpellId, target: UnitIndex| {
            sink.lock().unwrap().push(target);
        });
        let id = sim.register_spell(player, config).unwrap();
        sim.finalize().unwrap();

        sim.skip_cast_and_apply_effects(id, None);
        sim.cast(id, Some(boss));

        assert_eq!(*seen.lock().unwrap(), vec![boss, boss]);
        assert_eq!(sim.spell(id).target_metrics(boss).casts, 2);
    }

    #[test]
    fn test_cast_records_cast_time() {
        let (mut sim, player, boss) = two_unit_sim();
        let mut def = definition(5);
        def.default_cast.cast_time = 2.0;
        let id = sim.register_spell(player, def).unwrap();
        sim.finalize().unwrap();

        sim.spell_mut(id).cast_time_multiplier = 0.5;
        sim.cast(id, None);
        assert_eq!(sim.spell(id).target_metrics(boss).total_cast_time, Duration::from_secs(1));
    }

    #[test]
    fn test_aoe_threat_hits_opponents_only() {
        let (mut sim, player, boss) = two_unit_sim();
        let add = sim.add_unit(Unit::new(UnitIndex(0), "Add", UnitKind::Enemy, 80));
        let id = sim.register_spell(player, definition(6)).unwrap();
        sim.finalize().unwrap();

        sim.unit_mut(player).pseudo.threat_multiplier = 2.0;
        sim.apply_aoe_threat(id, 100.0);
        sim.apply_aoe_threat_ignore_multipliers(id, 10.0);

        assert!((sim.spell(id).target_metrics(boss).total_threat - 210.0).abs() < f64::EPSILON);
        assert!((sim.spell(id).target_metrics(add).total_threat - 210.0).abs() < f64::EPSILON);
        assert!((sim.spell(id).target_metrics(player).total_threat - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cur_damage_per_cast_without_casts() {
        let (mut sim, player, _) = two_unit_sim();
        let id = sim.register_spell(player, definition(7)).unwrap();
        sim.finalize().unwrap();
        assert!((sim.cur_damage_per_cast(id) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_until_advances_clock() {
        let (mut sim, _, _) = two_unit_sim();
        let fired = Arc::new(Mutex::new(Vec::new()));
        for secs in [2, 1] {
            let sink = Arc::clone(&fired);
            sim.schedule(Duration::from_secs(secs), move |sim: &mut Simulation| {
                sink.lock().unwrap().push(sim.now());
            });
        }

        sim.run_until(Duration::from_millis(1500));
        assert_eq!(*fired.lock().unwrap(), vec![Duration::from_secs(1)]);
        assert_eq!(sim.now(), Duration::from_millis(1500));
        assert_eq!(sim.pending_actions(), 1);
    }

    #[test]
    fn test_reset_iteration_restores_health() {
        let (mut sim, _, boss) = two_unit_sim();
        sim.unit_mut(boss).health = Some(crate::unit::HealthBar::new(1000.0));
        if let Some(health) = sim.unit_mut(boss).health.as_mut() {
            health.remove(400.0);
        }
        sim.encounter.damage_taken = 400.0;

        sim.reset_iteration(9).unwrap();
        assert_eq!(sim.unit(boss).health.map(|h| h.current_health), Some(1000.0));
        assert_eq!(sim.encounter, Encounter::default());
        assert_eq!(sim.seed(), 9);
    }
}
