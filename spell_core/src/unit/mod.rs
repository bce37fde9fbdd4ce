//! Units - casters and targets
//!
//! A unit carries the stats the pipeline reads, the pseudo-stat multipliers
//! auras write into, and the hook lists fired while dealing results.

mod reactions;

pub use reactions::{ReactionHandler, ReactionKind, Reactions};

use crate::spell::{Spell, SpellResult, UnitMetrics};
use crate::stats::{PseudoStats, Stats};
use crate::types::{School, SchoolTable, SpellId, UnitIndex, UnitKind};
use std::fmt;

/// Post-outcome damage modifier registered on a target. Runs in
/// registration order before the final clamp and may rewrite the result.
pub type DamageTakenModifier = Box<dyn FnMut(&Spell, &mut SpellResult) + Send>;

/// Runs once per spell registered on the unit, including spells that were
/// registered before the handler
pub type SpellRegisteredHandler = Box<dyn FnMut(&mut Spell) + Send>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    pub max_health: f64,
    pub current_health: f64,
}

impl HealthBar {
    pub fn new(max_health: f64) -> Self {
        HealthBar {
            max_health,
            current_health: max_health,
        }
    }

    /// Add health, capped at the maximum. Returns the amount actually gained.
    pub fn gain(&mut self, amount: f64) -> f64 {
        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health);
        self.current_health - before
    }

    pub fn remove(&mut self, amount: f64) {
        self.current_health = (self.current_health - amount).max(0.0);
    }

    pub fn reset(&mut self) {
        self.current_health = self.max_health;
    }
}

pub struct Unit {
    pub index: UnitIndex,
    pub name: String,
    pub kind: UnitKind,
    pub level: u32,

    pub stats: Stats,
    pub resistances: SchoolTable<f64>,
    pub pseudo: PseudoStats,

    pub current_target: Option<UnitIndex>,
    /// Yards, used for missile travel time
    pub distance_from_target: f64,
    pub health: Option<HealthBar>,

    pub dynamic_damage_taken_modifiers: Vec<DamageTakenModifier>,
    pub reactions: Reactions,
    pub(crate) spell_registered_handlers: Vec<SpellRegisteredHandler>,

    /// Spells owned by this unit, in registration order
    pub spellbook: Vec<SpellId>,
    pub metrics: UnitMetrics,
}

impl Unit {
    pub fn new(index: UnitIndex, name: impl Into<String>, kind: UnitKind, level: u32) -> Self {
        Unit {
            index,
            name: name.into(),
            kind,
            level,
            stats: Stats::new(),
            resistances: SchoolTable::default(),
            pseudo: PseudoStats::default(),
            current_target: None,
            distance_from_target: 0.0,
            health: None,
            dynamic_damage_taken_modifiers: Vec::new(),
            reactions: Reactions::default(),
            spell_registered_handlers: Vec::new(),
            spellbook: Vec::new(),
            metrics: UnitMetrics::default(),
        }
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_health(mut self, max_health: f64) -> Self {
        self.health = Some(HealthBar::new(max_health));
        self
    }

    pub fn is_enemy(&self) -> bool {
        self.kind == UnitKind::Enemy
    }

    pub fn is_opponent_of(&self, other: &Unit) -> bool {
        self.is_enemy() != other.is_enemy()
    }

    pub fn resistance(&self, school: School) -> f64 {
        self.resistances[school]
    }

    pub fn has_health_bar(&self) -> bool {
        self.health.is_some()
    }

    pub fn add_damage_taken_modifier(&mut self, modifier: DamageTakenModifier) {
        self.dynamic_damage_taken_modifiers.push(modifier);
    }

    pub fn on(&mut self, kind: ReactionKind, handler: ReactionHandler) {
        self.reactions.on(kind, handler);
    }

    /// Label used in combat log lines
    pub fn log_label(&self) -> String {
        format!("[{}]", self.name)
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("level", &self.level)
            .field("stats", &self.stats)
            .field("current_target", &self.current_target)
            .field("health", &self.health)
            .field("damage_taken_modifiers", &self.dynamic_damage_taken_modifiers.len())
            .field("reactions", &self.reactions)
            .field("spellbook", &self.spellbook)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_bar_caps_at_max() {
        let mut bar = HealthBar::new(1000.0);
        bar.remove(300.0);
        assert!((bar.gain(500.0) - 300.0).abs() < f64::EPSILON);
        assert!((bar.current_health - 1000.0).abs() < f64::EPSILON);

        bar.remove(5000.0);
        assert!((bar.current_health - 0.0).abs() < f64::EPSILON);
        bar.reset();
        assert!((bar.current_health - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_opponents() {
        let player = Unit::new(UnitIndex(0), "Player", UnitKind::Player, 80);
        let pet = Unit::new(UnitIndex(1), "Pet", UnitKind::Pet, 80);
        let boss = Unit::new(UnitIndex(2), "Boss", UnitKind::Enemy, 83).with_health(1.0e6);

        assert!(player.is_opponent_of(&boss));
        assert!(!player.is_opponent_of(&pet));
        assert!(boss.has_health_bar());
        assert_eq!(boss.log_label(), "[Boss]");
    }
}
