//! Periodic effects (DoTs and HoTs)
//!
//! A [`Dot`] freezes its base value and attacker-side multiplier when it is
//! applied. Every tick replays those two numbers in place of the live
//! attacker stage, then runs the target side of the pipeline live: target
//! multipliers, resistance, an independent outcome roll and the clamp.
//!
//! [`Dot::schedule_ticks`] keeps the effect in the simulation's
//! [`ActiveDots`], so a (spell, target) pair never runs two tick chains.

mod active;
mod snapshot;

pub use active::ActiveDots;
pub use snapshot::{PeriodicKind, Snapshot};

use crate::outcome::OutcomeApplier;
use crate::sim::Simulation;
use crate::spell::{ResultId, SpellResult};
use crate::types::{SpellId, UnitIndex};
use std::time::Duration;
use tracing::trace;

/// One periodic effect from one spell on one target
#[derive(Debug, Clone, Copy)]
pub struct Dot {
    pub spell: SpellId,
    pub target: UnitIndex,
    pub num_ticks: u32,
    pub tick_length: Duration,
    /// Applier used for every tick, usually `tick` or `magic_crit_tick`
    pub tick_outcome: OutcomeApplier,
    pub snapshot: Snapshot,
    ticks_remaining: u32,
}

impl Dot {
    pub fn new(
        spell: SpellId,
        target: UnitIndex,
        num_ticks: u32,
        tick_length: Duration,
        tick_outcome: OutcomeApplier,
    ) -> Self {
        Dot {
            spell,
            target,
            num_ticks,
            tick_length,
            tick_outcome,
            snapshot: Snapshot::default(),
            ticks_remaining: 0,
        }
    }

    /// Freeze `base_damage` and the caster's current attacker multiplier
    pub fn snapshot(&mut self, sim: &Simulation, base_damage: f64) {
        let multiplier = sim.attacker_damage_multiplier(self.spell, self.target);
        self.snapshot = Snapshot::damage(base_damage, multiplier);
    }

    /// Freeze `base_healing` and the caster's current healing multiplier
    pub fn snapshot_healing(&mut self, sim: &Simulation, base_healing: f64) {
        let multiplier = sim.caster_healing_multiplier(self.spell);
        self.snapshot = Snapshot::healing(base_healing, multiplier);
    }

    /// Start (or restart) the tick count. The snapshot is left as is.
    pub fn apply(&mut self) {
        self.ticks_remaining = self.num_ticks;
    }

    pub fn is_active(&self) -> bool {
        self.ticks_remaining > 0
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    pub fn duration(&self) -> Duration {
        self.tick_length * self.num_ticks
    }

    /// Calculate one tick from the snapshot without dealing it
    pub fn calc_snapshot_damage(&self, sim: &mut Simulation) -> ResultId {
        sim.calc_damage_internal(
            self.spell,
            self.target,
            self.snapshot.base,
            self.snapshot.attacker_multiplier,
            true,
            self.tick_outcome,
        )
    }

    pub fn calc_and_deal_periodic_snapshot_damage(&self, sim: &mut Simulation) -> SpellResult {
        let id = self.calc_snapshot_damage(sim);
        sim.deal_periodic_damage(self.spell, id)
    }

    pub fn calc_snapshot_healing(&self, sim: &mut Simulation) -> ResultId {
        sim.calc_healing_internal(
            self.spell,
            self.target,
            self.snapshot.base,
            self.snapshot.attacker_multiplier,
            self.tick_outcome,
        )
    }

    pub fn calc_and_deal_periodic_snapshot_healing(&self, sim: &mut Simulation) -> SpellResult {
        let id = self.calc_snapshot_healing(sim);
        sim.deal_periodic_healing(self.spell, id)
    }

    /// Deal one tick if any remain
    pub fn tick(&mut self, sim: &mut Simulation) -> Option<SpellResult> {
        if !self.is_active() {
            return None;
        }
        self.consume_tick();
        Some(self.deal_tick(sim))
    }

    pub(crate) fn consume_tick(&mut self) {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
    }

    fn deal_tick(&self, sim: &mut Simulation) -> SpellResult {
        let result = match self.snapshot.kind {
            PeriodicKind::Damage => self.calc_and_deal_periodic_snapshot_damage(sim),
            PeriodicKind::Healing => self.calc_and_deal_periodic_snapshot_healing(sim),
        };
        trace!(
            spell = self.spell.0,
            target = self.target.0,
            remaining = self.ticks_remaining,
            amount = result.damage,
            "periodic tick"
        );
        result
    }

    /// Apply the effect and put its ticks on the timeline, one tick length
    /// apart starting one tick length from now.
    ///
    /// If the same spell is already ticking on the target, the running
    /// effect takes this snapshot and a full tick count instead, and its
    /// next tick stays where it was.
    pub fn schedule_ticks(mut self, sim: &mut Simulation) {
        self.apply();
        let (spell, target, tick_length) = (self.spell, self.target, self.tick_length);
        if sim.active_dots_mut().apply(self) {
            trace!(spell = spell.0, target = target.0, "periodic effect refreshed");
            return;
        }
        Dot::schedule_next(spell, target, tick_length, sim);
    }

    fn schedule_next(spell: SpellId, target: UnitIndex, tick_length: Duration, sim: &mut Simulation) {
        let at = sim.now() + tick_length;
        sim.schedule(at, move |sim: &mut Simulation| {
            let Some(dot) = sim.active_dots_mut().take_tick(spell, target) else {
                return;
            };
            dot.deal_tick(sim);

            // A reaction hook may have refreshed the effect during the tick
            let next = sim
                .active_dot(spell, target)
                .filter(|d| d.is_active())
                .map(|d| d.tick_length);
            match next {
                Some(tick_length) => Dot::schedule_next(spell, target, tick_length, sim),
                None => {
                    sim.active_dots_mut().remove(spell, target);
                }
            }
        });
    }
}
