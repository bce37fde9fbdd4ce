//! Labelled random rolls
//!
//! Every roll names its purpose. [`SimRng`] gives each purpose its own
//! ChaCha stream derived from the iteration seed, so adding a roll of one
//! kind never shifts the sequence seen by another.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Why a random sample is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, strum::Display)]
pub enum RollPurpose {
    PhysicalCrit,
    MagicHit,
    MagicCrit,
    HealingCrit,
    WhiteHitTable,
    SpecialHitTable,
    RangedHitTable,
    EnemyHitTable,
    PartialResist,
}

/// Source of uniform samples in `[0, 1)`
pub trait RollSource: Send {
    fn roll(&mut self, purpose: RollPurpose) -> f64;

    /// Restart every stream from a new seed
    fn reseed(&mut self, seed: u64);
}

/// Per-iteration seeded generator, one stream per [`RollPurpose`]
#[derive(Debug, Clone)]
pub struct SimRng {
    streams: Vec<ChaCha8Rng>,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng {
            streams: RollPurpose::iter().map(|p| stream_for(seed, p)).collect(),
        }
    }
}

fn stream_for(seed: u64, purpose: RollPurpose) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(purpose as u64);
    rng
}

impl RollSource for SimRng {
    fn roll(&mut self, purpose: RollPurpose) -> f64 {
        self.streams[purpose as usize].gen::<f64>()
    }

    fn reseed(&mut self, seed: u64) {
        for (stream, purpose) in self.streams.iter_mut().zip(RollPurpose::iter()) {
            *stream = stream_for(seed, purpose);
        }
    }
}

/// Scripted rolls, served in order regardless of purpose.
/// Once the script runs out every roll returns `fallback`.
#[derive(Debug, Clone, Default)]
pub struct FixedRolls {
    script: VecDeque<f64>,
    fallback: f64,
    /// Purposes requested so far, in order
    pub requested: Vec<RollPurpose>,
}

impl FixedRolls {
    pub fn new(script: impl IntoIterator<Item = f64>) -> Self {
        FixedRolls {
            script: script.into_iter().collect(),
            fallback: 0.5,
            requested: Vec::new(),
        }
    }

    /// Every roll returns `value`
    pub fn constant(value: f64) -> Self {
        FixedRolls {
            fallback: value,
            ..Default::default()
        }
    }

    pub fn push(&mut self, value: f64) {
        self.script.push_back(value);
    }
}

impl RollSource for FixedRolls {
    fn roll(&mut self, purpose: RollPurpose) -> f64 {
        self.requested.push(purpose);
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn reseed(&mut self, _seed: u64) {}
}
