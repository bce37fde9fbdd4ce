//! Spell metrics - per-target counters for one iteration, and their
//! aggregation across iterations

use super::Spell;
use crate::outcome::HitOutcome;
use crate::types::{ActionId, School};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Totals for one spell against one target, for the current iteration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpellMetrics {
    pub casts: u32,
    pub misses: u32,
    pub hits: u32,
    pub crits: u32,
    pub crushes: u32,
    pub dodges: u32,
    pub glances: u32,
    pub parries: u32,
    pub blocks: u32,
    pub partial_resists_1_4: u32,
    pub partial_resists_2_4: u32,
    pub partial_resists_3_4: u32,
    pub total_damage: f64,
    pub total_threat: f64,
    pub total_healing: f64,
    pub total_shielding: f64,
    pub total_cast_time: Duration,
}

impl SpellMetrics {
    /// Count every outcome bit set on a dealt result
    pub fn record_outcome(&mut self, outcome: HitOutcome) {
        let counters = [
            (HitOutcome::MISS, &mut self.misses),
            (HitOutcome::HIT, &mut self.hits),
            (HitOutcome::CRIT, &mut self.crits),
            (HitOutcome::CRUSH, &mut self.crushes),
            (HitOutcome::DODGE, &mut self.dodges),
            (HitOutcome::GLANCE, &mut self.glances),
            (HitOutcome::PARRY, &mut self.parries),
            (HitOutcome::BLOCK, &mut self.blocks),
            (HitOutcome::PARTIAL_1_4, &mut self.partial_resists_1_4),
            (HitOutcome::PARTIAL_2_4, &mut self.partial_resists_2_4),
            (HitOutcome::PARTIAL_3_4, &mut self.partial_resists_3_4),
        ];
        for (flag, counter) in counters {
            if outcome.contains(flag) {
                *counter += 1;
            }
        }
    }

    /// Fold another set of totals into this one
    pub fn add(&mut self, other: &SpellMetrics) {
        self.casts += other.casts;
        self.misses += other.misses;
        self.hits += other.hits;
        self.crits += other.crits;
        self.crushes += other.crushes;
        self.dodges += other.dodges;
        self.glances += other.glances;
        self.parries += other.parries;
        self.blocks += other.blocks;
        self.partial_resists_1_4 += other.partial_resists_1_4;
        self.partial_resists_2_4 += other.partial_resists_2_4;
        self.partial_resists_3_4 += other.partial_resists_3_4;
        self.total_damage += other.total_damage;
        self.total_threat += other.total_threat;
        self.total_healing += other.total_healing;
        self.total_shielding += other.total_shielding;
        self.total_cast_time += other.total_cast_time;
    }

    pub fn damage_per_cast(&self) -> f64 {
        if self.casts == 0 {
            0.0
        } else {
            self.total_damage / self.casts as f64
        }
    }
}

/// Totals for one action summed over every completed iteration
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionMetrics {
    pub action_id: ActionId,
    pub school: School,
    /// Indexed by target unit
    pub targets: Vec<SpellMetrics>,
}

impl ActionMetrics {
    /// Sum over all targets
    pub fn total(&self) -> SpellMetrics {
        let mut total = SpellMetrics::default();
        for target in &self.targets {
            total.add(target);
        }
        total
    }
}

/// Per-unit aggregate over iterations
#[derive(Debug, Clone, Default)]
pub struct UnitMetrics {
    pub iterations: u32,
    actions: BTreeMap<ActionId, ActionMetrics>,
}

impl UnitMetrics {
    /// Fold one spell's iteration totals in
    pub fn add_spell(&mut self, spell: &Spell) {
        let entry = self
            .actions
            .entry(spell.action_id)
            .or_insert_with(|| ActionMetrics {
                action_id: spell.action_id,
                school: spell.school,
                targets: Vec::new(),
            });

        if entry.targets.len() < spell.metrics.len() {
            entry.targets.resize(spell.metrics.len(), SpellMetrics::default());
        }
        for (total, iteration) in entry.targets.iter_mut().zip(&spell.metrics) {
            total.add(iteration);
        }
    }

    pub fn done_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn action(&self, action_id: ActionId) -> Option<&ActionMetrics> {
        self.actions.get(&action_id)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionMetrics> {
        self.actions.values()
    }

    /// Mean damage per iteration for one action across all targets
    pub fn average_damage(&self, action_id: ActionId) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.action(action_id)
            .map_or(0.0, |a| a.total().total_damage / self.iterations as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcome_counts_each_bit() {
        let mut metrics = SpellMetrics::default();
        metrics.record_outcome(HitOutcome::HIT | HitOutcome::BLOCK);
        metrics.record_outcome(HitOutcome::CRIT | HitOutcome::PARTIAL_1_4);
        metrics.record_outcome(HitOutcome::MISS);

        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.blocks, 1);
        assert_eq!(metrics.crits, 1);
        assert_eq!(metrics.partial_resists_1_4, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.dodges, 0);
    }

    #[test]
    fn test_add_and_damage_per_cast() {
        let mut a = SpellMetrics {
            casts: 2,
            total_damage: 300.0,
            total_cast_time: Duration::from_millis(1500),
            ..Default::default()
        };
        let b = SpellMetrics {
            casts: 1,
            total_damage: 150.0,
            total_cast_time: Duration::from_millis(500),
            ..Default::default()
        };
        a.add(&b);

        assert_eq!(a.casts, 3);
        assert!((a.damage_per_cast() - 150.0).abs() < f64::EPSILON);
        assert_eq!(a.total_cast_time, Duration::from_secs(2));
        assert!((SpellMetrics::default().damage_per_cast() - 0.0).abs() < f64::EPSILON);
    }
}
