//! Spells - registered abilities bound to an owning unit
//!
//! A [`SpellDefinition`] is plain data loaded from config. [`SpellConfig`]
//! adds the function-valued pieces (effects, dynamic threat) attached in
//! code. Registration turns a config into a [`Spell`] owned by the
//! simulation's spell arena.

mod chances;
mod metrics;
mod modifiers;
mod result;
mod threat;

pub use metrics::{ActionMetrics, SpellMetrics, UnitMetrics};
pub use result::{ResultId, ResultPool, SpellResult};

use crate::error::SetupError;
use crate::sim::Simulation;
use crate::types::{ActionId, ResourceType, School, SpellId, UnitIndex};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Registering more than this many spells on one unit means something is
/// registering a spell every iteration
pub const MAX_SPELLS_PER_UNIT: usize = 100;

bitflags! {
    /// Behavioral switches on a spell
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SpellFlags: u32 {
        /// Skip the unit and attack-table multipliers on the attacker side
        const IGNORE_ATTACKER_MODIFIERS   = 1 << 0;
        const IGNORE_TARGET_MODIFIERS     = 1 << 1;
        /// Add the defender's flat bonus physical damage taken
        const INCLUDE_TARGET_BONUS_DAMAGE = 1 << 2;
        const DISEASE                     = 1 << 3;
        /// Leave this spell out of the unit's aggregated metrics
        const NO_METRICS                  = 1 << 4;
        const NO_LOGS                     = 1 << 5;
        const IGNORE_RESISTANCES          = 1 << 6;
        /// Binary spells are fully resisted or not at all, never partially
        const BINARY                      = 1 << 7;
    }
}

impl SpellFlags {
    pub fn matches(self, other: SpellFlags) -> bool {
        self.intersects(other)
    }
}

bitflags! {
    /// Which proc triggers a spell can fire. An empty mask means the
    /// spell never declared one.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ProcMask: u32 {
        /// Declared, but triggers nothing
        const EMPTY            = 1 << 0;
        const MELEE_MH_AUTO    = 1 << 1;
        const MELEE_OH_AUTO    = 1 << 2;
        const MELEE_MH_SPECIAL = 1 << 3;
        const MELEE_OH_SPECIAL = 1 << 4;
        const RANGED_AUTO      = 1 << 5;
        const RANGED_SPECIAL   = 1 << 6;
        const SPELL_DAMAGE     = 1 << 7;
        const SPELL_HEALING    = 1 << 8;
        const PERIODIC_DAMAGE  = 1 << 9;
        const PROC             = 1 << 10;

        const MELEE_MH = Self::MELEE_MH_AUTO.bits() | Self::MELEE_MH_SPECIAL.bits();
        const MELEE_OH = Self::MELEE_OH_AUTO.bits() | Self::MELEE_OH_SPECIAL.bits();
        const MELEE = Self::MELEE_MH.bits() | Self::MELEE_OH.bits();
        const RANGED = Self::RANGED_AUTO.bits() | Self::RANGED_SPECIAL.bits();
    }
}

impl ProcMask {
    /// Mask was never set
    pub fn is_unknown(self) -> bool {
        self.is_empty()
    }

    pub fn matches(self, other: ProcMask) -> bool {
        self.intersects(other)
    }
}

/// Cast parameters with all static effects applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCast {
    pub cost: f64,
    /// Seconds
    pub cast_time: f64,
}

impl DefaultCast {
    pub fn cast_duration(&self) -> Duration {
        Duration::from_secs_f64(self.cast_time.max(0.0))
    }
}

/// Plain-data part of a spell, deserializable from config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellDefinition {
    pub action_id: ActionId,
    pub school: School,
    pub proc_mask: ProcMask,
    pub flags: SpellFlags,
    /// Yards per second
    pub missile_speed: f64,
    pub resource_type: Option<ResourceType>,
    pub base_cost: f64,
    pub default_cast: DefaultCast,

    pub bonus_hit_rating: f64,
    pub bonus_crit_rating: f64,
    pub bonus_spell_power: f64,
    pub bonus_expertise_rating: f64,
    pub bonus_armor_pen_rating: f64,

    pub damage_multiplier: f64,
    pub damage_multiplier_additive: f64,
    pub crit_multiplier: f64,

    pub threat_multiplier: f64,
    pub flat_threat_bonus: f64,
}

/// Threat hook evaluated against a finished result
pub type DynamicThreatFn = fn(&SpellResult, &Spell) -> f64;

/// What a spell does when it is cast: usually one or more calc/deal calls
#[derive(Clone)]
pub struct ApplyEffects(Arc<dyn Fn(&mut Simulation, SpellId, UnitIndex) + Send + Sync>);

impl ApplyEffects {
    pub fn new(f: impl Fn(&mut Simulation, SpellId, UnitIndex) + Send + Sync + 'static) -> Self {
        ApplyEffects(Arc::new(f))
    }

    pub fn call(&self, sim: &mut Simulation, spell: SpellId, target: UnitIndex) {
        (self.0)(sim, spell, target)
    }
}

impl fmt::Debug for ApplyEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplyEffects(..)")
    }
}

/// Everything needed to register a spell
#[derive(Debug, Clone, Default)]
pub struct SpellConfig {
    pub definition: SpellDefinition,
    pub apply_effects: Option<ApplyEffects>,
    pub dynamic_threat_multiplier: Option<DynamicThreatFn>,
    pub dynamic_threat_bonus: Option<DynamicThreatFn>,
}

impl SpellConfig {
    pub fn new(definition: SpellDefinition) -> Self {
        SpellConfig {
            definition,
            ..Default::default()
        }
    }

    pub fn with_effects(
        mut self,
        f: impl Fn(&mut Simulation, SpellId, UnitIndex) + Send + Sync + 'static,
    ) -> Self {
        self.apply_effects = Some(ApplyEffects::new(f));
        self
    }

    pub fn with_dynamic_threat_multiplier(mut self, f: DynamicThreatFn) -> Self {
        self.dynamic_threat_multiplier = Some(f);
        self
    }

    pub fn with_dynamic_threat_bonus(mut self, f: DynamicThreatFn) -> Self {
        self.dynamic_threat_bonus = Some(f);
        self
    }
}

impl From<SpellDefinition> for SpellConfig {
    fn from(definition: SpellDefinition) -> Self {
        SpellConfig::new(definition)
    }
}

/// Values captured at finalize and restored at every iteration start
#[derive(Debug, Clone, Copy, Default)]
struct InitialValues {
    bonus_hit_rating: f64,
    bonus_crit_rating: f64,
    bonus_spell_power: f64,
    damage_multiplier: f64,
    damage_multiplier_additive: f64,
    crit_multiplier: f64,
    threat_multiplier: f64,
}

#[derive(Debug)]
pub struct Spell {
    pub id: SpellId,
    pub action_id: ActionId,
    /// Owning unit
    pub unit: UnitIndex,

    pub school: School,
    pub proc_mask: ProcMask,
    pub flags: SpellFlags,
    pub missile_speed: f64,
    pub resource_type: Option<ResourceType>,
    pub base_cost: f64,
    pub default_cast: DefaultCast,

    pub bonus_hit_rating: f64,
    pub bonus_crit_rating: f64,
    pub bonus_spell_power: f64,
    pub bonus_expertise_rating: f64,
    pub bonus_armor_pen_rating: f64,
    pub cast_time_multiplier: f64,
    pub cost_multiplier: f64,
    pub damage_multiplier: f64,
    pub damage_multiplier_additive: f64,
    pub crit_multiplier: f64,

    pub threat_multiplier: f64,
    pub dynamic_threat_multiplier: Option<DynamicThreatFn>,
    /// Added before multipliers
    pub flat_threat_bonus: f64,
    pub dynamic_threat_bonus: Option<DynamicThreatFn>,

    pub(crate) apply_effects: Option<ApplyEffects>,

    /// This iteration's totals, indexed by target unit
    pub metrics: Vec<SpellMetrics>,
    pub(crate) results: ResultPool,
    initial: InitialValues,
}

impl Spell {
    /// Validate a config and apply multiplier defaults
    pub(crate) fn from_config(
        id: SpellId,
        unit: UnitIndex,
        config: SpellConfig,
    ) -> Result<Spell, SetupError> {
        let SpellConfig {
            definition: def,
            apply_effects,
            dynamic_threat_multiplier,
            dynamic_threat_bonus,
        } = config;
        let action = def.action_id;

        // Default the other damage multiplier to 1 if only one is set
        let mut damage_multiplier = def.damage_multiplier;
        let mut damage_multiplier_additive = def.damage_multiplier_additive;
        if damage_multiplier != 0.0 && damage_multiplier_additive == 0.0 {
            damage_multiplier_additive = 1.0;
        }
        if damage_multiplier_additive != 0.0 && damage_multiplier == 0.0 {
            damage_multiplier = 1.0;
        }

        if (damage_multiplier != 0.0 || def.threat_multiplier != 0.0) && def.proc_mask.is_unknown() {
            return Err(SetupError::UnknownProcMask { action });
        }

        match (def.resource_type, def.default_cast.cost != 0.0) {
            (Some(_), false) => return Err(SetupError::ResourceWithoutCost { action }),
            (None, true) => return Err(SetupError::CostWithoutResource { action }),
            _ => {}
        }

        let crit_multiplier = if def.crit_multiplier == 0.0 {
            1.0
        } else {
            def.crit_multiplier
        };

        Ok(Spell {
            id,
            action_id: action,
            unit,
            school: def.school,
            proc_mask: def.proc_mask,
            flags: def.flags,
            missile_speed: def.missile_speed,
            resource_type: def.resource_type,
            base_cost: def.base_cost,
            default_cast: def.default_cast,
            bonus_hit_rating: def.bonus_hit_rating,
            bonus_crit_rating: def.bonus_crit_rating,
            bonus_spell_power: def.bonus_spell_power,
            bonus_expertise_rating: def.bonus_expertise_rating,
            bonus_armor_pen_rating: def.bonus_armor_pen_rating,
            cast_time_multiplier: 1.0,
            cost_multiplier: 1.0,
            damage_multiplier,
            damage_multiplier_additive,
            crit_multiplier,
            threat_multiplier: def.threat_multiplier,
            dynamic_threat_multiplier,
            flat_threat_bonus: def.flat_threat_bonus,
            dynamic_threat_bonus,
            apply_effects,
            metrics: Vec::new(),
            results: ResultPool::new(),
            initial: InitialValues::default(),
        })
    }

    /// Capture the static values that `reset` restores. Cast-time and cost
    /// multipliers are runtime-only and must still be 1 here.
    pub(crate) fn finalize(&mut self) -> Result<(), SetupError> {
        if self.cast_time_multiplier != 1.0 {
            return Err(SetupError::NonDefaultAtFinalize {
                action: self.action_id,
                field: "cast_time_multiplier",
            });
        }
        if self.cost_multiplier != 1.0 {
            return Err(SetupError::NonDefaultAtFinalize {
                action: self.action_id,
                field: "cost_multiplier",
            });
        }

        self.initial = InitialValues {
            bonus_hit_rating: self.bonus_hit_rating,
            bonus_crit_rating: self.bonus_crit_rating,
            bonus_spell_power: self.bonus_spell_power,
            damage_multiplier: self.damage_multiplier,
            damage_multiplier_additive: self.damage_multiplier_additive,
            crit_multiplier: self.crit_multiplier,
            threat_multiplier: self.threat_multiplier,
        };
        Ok(())
    }

    /// Zero metrics and restore every dynamic field to its finalized value
    pub(crate) fn reset(&mut self, num_units: usize) {
        if self.metrics.len() != num_units {
            self.metrics = vec![SpellMetrics::default(); num_units];
        } else {
            self.metrics.fill(SpellMetrics::default());
        }
        self.results.reset();

        let initial = self.initial;
        self.bonus_hit_rating = initial.bonus_hit_rating;
        self.bonus_crit_rating = initial.bonus_crit_rating;
        self.bonus_spell_power = initial.bonus_spell_power;
        self.cast_time_multiplier = 1.0;
        self.cost_multiplier = 1.0;
        self.damage_multiplier = initial.damage_multiplier;
        self.damage_multiplier_additive = initial.damage_multiplier_additive;
        self.crit_multiplier = initial.crit_multiplier;
        self.threat_multiplier = initial.threat_multiplier;
    }

    /// Grow the metrics array to cover the roster, for spells used before
    /// their first reset
    pub(crate) fn ensure_metrics(&mut self, num_units: usize) {
        if self.metrics.len() < num_units {
            self.metrics.resize(num_units, SpellMetrics::default());
        }
    }

    pub(crate) fn metrics_mut(&mut self, target: UnitIndex) -> &mut SpellMetrics {
        if self.metrics.len() <= target.0 {
            self.metrics.resize(target.0 + 1, SpellMetrics::default());
        }
        &mut self.metrics[target.0]
    }

    /// This iteration's totals against one target
    pub fn target_metrics(&self, target: UnitIndex) -> SpellMetrics {
        self.metrics.get(target.0).cloned().unwrap_or_default()
    }

    /// Missile flight time over `distance` yards. Instant when the spell
    /// has no missile.
    pub fn travel_time(&self, distance: f64) -> Duration {
        if self.missile_speed <= 0.0 || distance <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(distance / self.missile_speed)
    }

    /// Results currently checked out of this spell's pool
    pub fn results_in_use(&self) -> usize {
        self.results.in_use()
    }

    pub fn logs_enabled(&self) -> bool {
        !self.flags.matches(SpellFlags::NO_LOGS)
    }
}
