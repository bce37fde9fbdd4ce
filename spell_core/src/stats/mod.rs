//! Stats - rating/power values and identity-defaulted pseudo-stats

mod pseudo;

pub use pseudo::PseudoStats;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use strum::{EnumCount, EnumIter};

/// A stat the pipeline reads from a unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumCount, EnumIter, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    AttackPower,
    RangedAttackPower,
    SpellPower,
    MeleeHit,
    MeleeCrit,
    SpellHit,
    SpellCrit,
    Expertise,
    ArmorPenetration,
    Armor,
    BlockValue,
}

/// Flat stat values, indexed by [`Stat`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats([f64; Stat::COUNT]);

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a sparse map, as loaded from config
    pub fn from_map(values: &HashMap<Stat, f64>) -> Self {
        let mut stats = Stats::new();
        for (stat, value) in values {
            stats[*stat] = *value;
        }
        stats
    }

    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self[stat] = value;
        self
    }

    pub fn add(&mut self, stat: Stat, value: f64) {
        self[stat] += value;
    }
}

impl Index<Stat> for Stats {
    type Output = f64;

    fn index(&self, stat: Stat) -> &f64 {
        &self.0[stat as usize]
    }
}

impl IndexMut<Stat> for Stats {
    fn index_mut(&mut self, stat: Stat) -> &mut f64 {
        &mut self.0[stat as usize]
    }
}
