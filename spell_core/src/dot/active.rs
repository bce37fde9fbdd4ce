//! Active periodic effects on the simulation
//!
//! At most one [`Dot`] per (spell, target) is live at a time. Re-applying
//! one that is still ticking refreshes it in place: new snapshot, full tick
//! count, and the pending tick keeps its time.

use super::Dot;
use crate::types::{SpellId, UnitIndex};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ActiveDots {
    dots: HashMap<(SpellId, UnitIndex), Dot>,
}

impl ActiveDots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, spell: SpellId, target: UnitIndex) -> Option<&Dot> {
        self.dots.get(&(spell, target))
    }

    /// Store an applied dot. Returns true when it replaced one that still
    /// has a tick chain on the timeline.
    pub fn apply(&mut self, dot: Dot) -> bool {
        self.dots.insert((dot.spell, dot.target), dot).is_some()
    }

    /// Use up one tick of the stored dot and return a copy to deal it with
    pub fn take_tick(&mut self, spell: SpellId, target: UnitIndex) -> Option<Dot> {
        let dot = self.dots.get_mut(&(spell, target))?;
        if !dot.is_active() {
            return None;
        }
        let snapshot = *dot;
        dot.consume_tick();
        Some(snapshot)
    }

    pub fn remove(&mut self, spell: SpellId, target: UnitIndex) -> Option<Dot> {
        self.dots.remove(&(spell, target))
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn clear(&mut self) {
        self.dots.clear();
    }
}
