//! Ordered probability bands over [0, 1)

use super::HitOutcome;

/// Most bands any resolver needs: miss, dodge, parry, block, glance, crush, crit, hit
const MAX_BANDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub outcome: HitOutcome,
    pub width: f64,
}

/// A partition of [0, 1) into outcome bands, built in priority order.
///
/// Each pushed chance is clamped to what is left of the unit interval, so
/// the bands never overlap and never run past 1. [`finish`](Self::finish)
/// gives the remainder to `HIT`.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeBands {
    bands: [Band; MAX_BANDS],
    len: usize,
    remaining: f64,
}

impl Default for OutcomeBands {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeBands {
    pub fn new() -> Self {
        OutcomeBands {
            bands: [Band {
                outcome: HitOutcome::EMPTY,
                width: 0.0,
            }; MAX_BANDS],
            len: 0,
            remaining: 1.0,
        }
    }

    /// Append a band; negative chances produce an empty band
    pub fn push(mut self, outcome: HitOutcome, chance: f64) -> Self {
        if self.len == MAX_BANDS {
            return self;
        }
        let width = chance.clamp(0.0, self.remaining);
        self.bands[self.len] = Band { outcome, width };
        self.len += 1;
        self.remaining -= width;
        self
    }

    /// Close the table with a normal hit covering whatever is left
    pub fn finish(self) -> Self {
        let remaining = self.remaining;
        self.push(HitOutcome::HIT, remaining)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands[..self.len]
    }

    pub fn total_width(&self) -> f64 {
        self.bands().iter().map(|b| b.width).sum()
    }

    /// Outcome whose band contains `sample`
    pub fn classify(&self, sample: f64) -> HitOutcome {
        let mut cumulative = 0.0;
        for band in self.bands() {
            cumulative += band.width;
            if sample < cumulative {
                return band.outcome;
            }
        }
        // Rounding can leave the top of [0, 1) uncovered by a hair
        self.bands()
            .iter()
            .rev()
            .find(|b| b.width > 0.0)
            .map_or(HitOutcome::HIT, |b| b.outcome)
    }
}
