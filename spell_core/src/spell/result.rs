//! Spell results and the per-spell result pool

use crate::outcome::HitOutcome;
use crate::types::UnitIndex;

/// One in-flight computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpellResult {
    pub target: UnitIndex,
    pub outcome: HitOutcome,
    /// Damage, or healing for heal results
    pub damage: f64,
    /// Damage before the outcome was applied, kept for reporting
    pub pre_outcome_damage: f64,
    /// Partial resist or armor multiplier
    pub resistance_multiplier: f64,
}

impl Default for SpellResult {
    fn default() -> Self {
        SpellResult::new(UnitIndex(0), 0.0)
    }
}

impl SpellResult {
    pub fn new(target: UnitIndex, damage: f64) -> Self {
        SpellResult {
            target,
            outcome: HitOutcome::EMPTY,
            damage,
            pre_outcome_damage: damage,
            resistance_multiplier: 1.0,
        }
    }

    pub fn landed(&self) -> bool {
        self.outcome.matches(HitOutcome::LANDED)
    }

    pub fn did_crit(&self) -> bool {
        self.outcome.matches(HitOutcome::CRIT)
    }

    pub fn damage_string(&self) -> String {
        if !self.landed() {
            return self.outcome.to_string();
        }
        format!("{} for {:.3} damage", self.outcome, self.damage)
    }

    pub fn healing_string(&self) -> String {
        format!("{} for {:.3} healing", self.outcome, self.damage)
    }
}

const INLINE_SLOTS: usize = 4;

/// Handle to a result checked out of a [`ResultPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultId {
    Inline(u8),
    Overflow(u32),
}

/// Small fixed pool of results per spell.
///
/// Inline slots cover every non-reentrant cast. When a hook starts another
/// calculation on the same spell before the first result is dealt, the
/// nested one gets a different slot, spilling into the overflow vector once
/// the inline slots are taken.
#[derive(Debug, Clone, Default)]
pub struct ResultPool {
    inline: [SpellResult; INLINE_SLOTS],
    in_use: u8,
    overflow: Vec<SpellResult>,
    overflow_free: Vec<u32>,
}

impl ResultPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result` in a free slot
    pub fn acquire(&mut self, result: SpellResult) -> ResultId {
        let slot = (!self.in_use).trailing_zeros() as usize;
        if slot < INLINE_SLOTS {
            self.in_use |= 1 << slot;
            self.inline[slot] = result;
            return ResultId::Inline(slot as u8);
        }

        match self.overflow_free.pop() {
            Some(index) => {
                self.overflow[index as usize] = result;
                ResultId::Overflow(index)
            }
            None => {
                self.overflow.push(result);
                ResultId::Overflow((self.overflow.len() - 1) as u32)
            }
        }
    }

    pub fn get(&self, id: ResultId) -> &SpellResult {
        match id {
            ResultId::Inline(slot) => &self.inline[slot as usize],
            ResultId::Overflow(index) => &self.overflow[index as usize],
        }
    }

    pub fn get_mut(&mut self, id: ResultId) -> &mut SpellResult {
        match id {
            ResultId::Inline(slot) => &mut self.inline[slot as usize],
            ResultId::Overflow(index) => &mut self.overflow[index as usize],
        }
    }

    pub fn is_in_use(&self, id: ResultId) -> bool {
        match id {
            ResultId::Inline(slot) => self.in_use & (1 << slot) != 0,
            ResultId::Overflow(index) => {
                (index as usize) < self.overflow.len() && !self.overflow_free.contains(&index)
            }
        }
    }

    /// Return the slot to the pool, handing back its final value
    pub fn release(&mut self, id: ResultId) -> SpellResult {
        let result = *self.get(id);
        match id {
            ResultId::Inline(slot) => self.in_use &= !(1 << slot),
            ResultId::Overflow(index) => {
                if !self.overflow_free.contains(&index) {
                    self.overflow_free.push(index);
                }
            }
        }
        result
    }

    /// Number of results currently checked out
    pub fn in_use(&self) -> usize {
        self.in_use.count_ones() as usize + self.overflow.len() - self.overflow_free.len()
    }

    /// Drop every checkout; called between iterations
    pub fn reset(&mut self) {
        self.in_use = 0;
        self.overflow.clear();
        self.overflow_free.clear();
    }
}
