//! Prelude module for convenient imports
//!
//! ```rust
//! use spell_core::prelude::*;
//! ```

// Identifiers
pub use crate::types::{ActionId, ResourceType, School, SchoolTable, SpellId, UnitIndex, UnitKind};

// Units and stats
pub use crate::stats::{PseudoStats, Stat, Stats};
pub use crate::unit::{HealthBar, ReactionKind, Unit};

// Spells
pub use crate::spell::{
    DefaultCast, ProcMask, ResultId, Spell, SpellConfig, SpellDefinition, SpellFlags, SpellMetrics,
    SpellResult,
};

// Resolution
pub use crate::outcome::{HitOutcome, OutcomeApplier, OutcomeKind};
pub use crate::roll::{FixedRolls, RollPurpose, RollSource, SimRng};

// Simulation
pub use crate::config::CombatConstants;
pub use crate::dot::Dot;
pub use crate::error::SetupError;
pub use crate::sim::{Simulation, Timeline};
