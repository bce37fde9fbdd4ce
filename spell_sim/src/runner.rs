//! Trial runner
//!
//! One iteration builds a fresh simulation from the scenario, plays the
//! rotation out on the timeline and reads the per-action totals back.
//! Trials run in parallel; iteration `i` is always seeded `base_seed + i`,
//! so the same inputs give the same summary on any thread count.

use crate::scenario::{Scenario, ScenarioError, ScheduledCast};
use crate::summary::TrialSummary;
use rayon::prelude::*;
use spell_core::prelude::*;
use std::time::Duration;
use tracing::{debug, info};

/// One action's totals for a single iteration, summed over every target
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTotals {
    pub owner: String,
    pub action_id: ActionId,
    pub metrics: SpellMetrics,
}

/// What one iteration produced
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub seed: u64,
    /// Damage taken by enemy units
    pub encounter_damage: f64,
    pub actions: Vec<ActionTotals>,
}

/// Run a single iteration of `scenario` seeded with `seed`
pub fn run_iteration(scenario: &Scenario, seed: u64) -> Result<IterationResult, ScenarioError> {
    let mut built = scenario.build(seed)?;
    let sim = &mut built.sim;
    sim.reset_iteration(seed)?;

    for cast in &built.casts {
        schedule_rotation(sim, cast, built.duration);
    }
    sim.run_until(built.duration);

    let actions = sim
        .spells()
        .iter()
        .filter(|spell| !spell.flags.matches(SpellFlags::NO_METRICS))
        .map(|spell| {
            let mut metrics = SpellMetrics::default();
            for target in &spell.metrics {
                metrics.add(target);
            }
            ActionTotals {
                owner: sim.unit(spell.unit).name.clone(),
                action_id: spell.action_id,
                metrics,
            }
        })
        .collect();
    let encounter_damage = sim.encounter.damage_taken;
    sim.done_iteration();

    debug!(seed, encounter_damage, "iteration complete");
    Ok(IterationResult {
        seed,
        encounter_damage,
        actions,
    })
}

/// Put every cast of one rotation entry that starts before `end` on the timeline
fn schedule_rotation(sim: &mut Simulation, cast: &ScheduledCast, end: Duration) {
    let ScheduledCast { spell, target, start, every } = *cast;
    let mut at = start;
    while at < end {
        sim.schedule(at, move |sim: &mut Simulation| sim.cast(spell, target));
        if every.is_zero() {
            break;
        }
        at += every;
    }
}

/// Run `iterations` independent iterations in parallel and aggregate them
pub fn run_trials(scenario: &Scenario, iterations: u32, base_seed: u64) -> Result<TrialSummary, ScenarioError> {
    if iterations == 0 {
        return Err(ScenarioError::Invalid("iterations must be at least 1".to_string()));
    }
    info!(iterations, base_seed, "running trials");

    let results = (0..iterations)
        .into_par_iter()
        .map(|i| run_iteration(scenario, base_seed.wrapping_add(u64::from(i))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TrialSummary::from_results(&results))
}
