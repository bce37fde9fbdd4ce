//! Aggregated trial results

use crate::runner::IterationResult;
use serde::Serialize;
use spell_core::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Mean, min and max of one quantity over all iterations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Spread {
    fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return Spread::default();
        }
        Spread {
            mean: sum / count as f64,
            min,
            max,
        }
    }
}

/// Per-iteration averages for one action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSummary {
    pub owner: String,
    pub action: String,
    pub casts: f64,
    pub damage: Spread,
    pub threat: f64,
    pub healing: f64,
    /// Outcome counts summed over every iteration
    pub outcomes: SpellMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub iterations: usize,
    pub encounter_damage: Spread,
    pub actions: Vec<ActionSummary>,
}

impl TrialSummary {
    pub fn from_results(results: &[IterationResult]) -> Self {
        let iterations = results.len();
        let encounter_damage = Spread::from_values(results.iter().map(|r| r.encounter_damage));

        let mut per_action: BTreeMap<(String, ActionId), Vec<&SpellMetrics>> = BTreeMap::new();
        for result in results {
            for totals in &result.actions {
                per_action
                    .entry((totals.owner.clone(), totals.action_id))
                    .or_default()
                    .push(&totals.metrics);
            }
        }

        let per_iteration = |sum: f64| if iterations == 0 { 0.0 } else { sum / iterations as f64 };
        let actions = per_action
            .into_iter()
            .map(|((owner, action_id), metrics)| {
                let mut outcomes = SpellMetrics::default();
                for m in &metrics {
                    outcomes.add(m);
                }
                ActionSummary {
                    owner,
                    action: action_id.to_string(),
                    casts: per_iteration(f64::from(outcomes.casts)),
                    damage: Spread::from_values(metrics.iter().map(|m| m.total_damage)),
                    threat: per_iteration(outcomes.total_threat),
                    healing: per_iteration(outcomes.total_healing),
                    outcomes,
                }
            })
            .collect();

        TrialSummary {
            iterations,
            encounter_damage,
            actions,
        }
    }
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(
            f,
            "Encounter damage: {:.1} (min {:.1}, max {:.1})",
            self.encounter_damage.mean, self.encounter_damage.min, self.encounter_damage.max
        )?;
        for action in &self.actions {
            let o = &action.outcomes;
            writeln!(f, "{} {}", action.owner, action.action)?;
            writeln!(
                f,
                "  casts {:.2}  damage {:.1} (min {:.1}, max {:.1})  threat {:.1}  healing {:.1}",
                action.casts, action.damage.mean, action.damage.min, action.damage.max, action.threat, action.healing
            )?;
            writeln!(
                f,
                "  hits {}  crits {}  misses {}  dodges {}  parries {}  blocks {}  glances {}",
                o.hits, o.crits, o.misses, o.dodges, o.parries, o.blocks, o.glances
            )?;
        }
        Ok(())
    }
}
