//! spell_core - Deterministic combat resolution for spells and attacks
//!
//! This library provides:
//! - AttackTable: per attacker/defender avoidance chances and multipliers
//! - Outcome appliers: pluggable resolvers that roll hit, crit, miss, etc.
//! - Simulation: the unit/spell arena with the calc/deal pipeline
//! - Dot: periodic effects that snapshot the caster's multipliers
//! - Metrics and threat: per-target totals for each spell, per iteration

pub mod attack_table;
pub mod config;
pub mod defense;
pub mod dot;
pub mod error;
pub mod outcome;
pub mod prelude;
pub mod roll;
pub mod sim;
pub mod spell;
pub mod stats;
pub mod types;
pub mod unit;

// Re-export core types for convenience
pub use attack_table::{AttackTable, AttackTables};
pub use config::{CombatConstants, ConfigError};
pub use dot::{Dot, Snapshot};
pub use error::SetupError;
pub use outcome::{HitOutcome, OutcomeApplier, OutcomeKind};
pub use roll::{FixedRolls, RollPurpose, RollSource, SimRng};
pub use sim::{CombatLog, Simulation, Timeline};
pub use spell::{Spell, SpellConfig, SpellDefinition, SpellFlags, SpellMetrics, SpellResult};
pub use types::{ActionId, School, SpellId, UnitIndex, UnitKind};
pub use unit::{ReactionKind, Unit};
