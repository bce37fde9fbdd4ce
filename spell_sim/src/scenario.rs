//! Scenario - a TOML description of one encounter
//!
//! A scenario names the units, the spells each unit owns with what they do
//! when cast, and a fixed rotation. `build` turns it into a fresh
//! `Simulation` every time it is called, so each trial owns its state.

use serde::{Deserialize, Serialize};
use spell_core::config::{load_toml, parse_toml, validate_constants, ConfigError};
use spell_core::dot::Dot;
use spell_core::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Rotation names {0}, which no unit owns")]
    UnknownSpell(ActionId),

    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default)]
    pub seed: u64,
    /// Seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub constants: CombatConstants,
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub spells: Vec<SpellSpec>,
    #[serde(default)]
    pub rotation: Vec<RotationEntry>,
}

fn default_iterations() -> u32 {
    1000
}

fn default_duration() -> f64 {
    180.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    #[serde(default)]
    pub kind: UnitKind,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Name of the unit this one attacks
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub distance_from_target: f64,
    #[serde(default)]
    pub health: Option<f64>,
    #[serde(default)]
    pub stats: HashMap<Stat, f64>,
    #[serde(default)]
    pub resistances: HashMap<School, f64>,
    #[serde(default)]
    pub pseudo: PseudoStats,
}

fn default_level() -> u32 {
    spell_core::config::CHARACTER_LEVEL
}

/// What a spell does when cast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[default]
    Damage,
    Healing,
    PeriodicDamage,
    PeriodicHealing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellSpec {
    pub owner: String,
    #[serde(default)]
    pub effect: EffectKind,
    /// Damage or healing before any multiplier; per tick for periodic effects
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub outcome: OutcomeKind,
    #[serde(default)]
    pub ticks: u32,
    /// Seconds between ticks
    #[serde(default)]
    pub tick_length: f64,
    pub definition: SpellDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationEntry {
    pub spell: ActionId,
    /// First cast, in seconds
    #[serde(default)]
    pub start: f64,
    /// Seconds between casts; zero casts once
    #[serde(default)]
    pub every: f64,
    /// Defaults to the owner's target
    #[serde(default)]
    pub target: Option<String>,
}

/// A built scenario, ready for one iteration
pub struct BuiltEncounter {
    pub sim: Simulation,
    pub casts: Vec<ScheduledCast>,
    pub duration: Duration,
}

/// One rotation entry resolved to arena handles
#[derive(Debug, Clone, Copy)]
pub struct ScheduledCast {
    pub spell: SpellId,
    pub target: Option<UnitIndex>,
    pub start: Duration,
    pub every: Duration,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = load_toml(path)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a TOML string
    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = parse_toml(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.units.is_empty() {
            return Err(ScenarioError::Invalid("scenario has no units".to_string()));
        }
        if self.duration <= 0.0 {
            return Err(ScenarioError::Invalid(format!("duration must be positive, got {}", self.duration)));
        }
        validate_constants(&self.constants)?;
        for spell in &self.spells {
            let periodic = matches!(spell.effect, EffectKind::PeriodicDamage | EffectKind::PeriodicHealing);
            if periodic && (spell.ticks == 0 || spell.tick_length <= 0.0) {
                return Err(ScenarioError::Invalid(format!(
                    "periodic spell {} needs ticks and tick_length",
                    spell.definition.action_id
                )));
            }
        }
        Ok(())
    }

    fn unit_index(&self, name: &str) -> Result<UnitIndex, ScenarioError> {
        self.units
            .iter()
            .position(|u| u.name == name)
            .map(UnitIndex)
            .ok_or_else(|| ScenarioError::UnknownUnit(name.to_string()))
    }

    /// Build a fresh, finalized simulation seeded with `seed`
    pub fn build(&self, seed: u64) -> Result<BuiltEncounter, ScenarioError> {
        let mut sim = Simulation::new(self.constants.clone(), seed);

        for spec in &self.units {
            let mut unit = Unit::new(UnitIndex(0), spec.name.clone(), spec.kind, spec.level)
                .with_stats(Stats::from_map(&spec.stats));
            for (school, value) in &spec.resistances {
                unit.resistances[*school] = *value;
            }
            unit.pseudo = spec.pseudo.clone();
            unit.distance_from_target = spec.distance_from_target;
            if let Some(health) = spec.health {
                unit = unit.with_health(health);
            }
            sim.add_unit(unit);
        }
        for (index, spec) in self.units.iter().enumerate() {
            if let Some(target) = &spec.target {
                let target = self.unit_index(target)?;
                sim.unit_mut(UnitIndex(index)).current_target = Some(target);
            }
        }

        for spec in &self.spells {
            let owner = self.unit_index(&spec.owner)?;
            sim.register_spell(owner, spell_config(spec))?;
        }
        sim.finalize()?;

        let mut casts = Vec::with_capacity(self.rotation.len());
        for entry in &self.rotation {
            let spell = self
                .spells
                .iter()
                .find(|s| s.definition.action_id == entry.spell)
                .ok_or(ScenarioError::UnknownSpell(entry.spell))?;
            let owner = self.unit_index(&spell.owner)?;
            let spell = sim
                .get_spell(owner, entry.spell)
                .ok_or(ScenarioError::UnknownSpell(entry.spell))?;
            let target = entry.target.as_deref().map(|name| self.unit_index(name)).transpose()?;

            casts.push(ScheduledCast {
                spell,
                target,
                start: Duration::from_secs_f64(entry.start.max(0.0)),
                every: Duration::from_secs_f64(entry.every.max(0.0)),
            });
        }

        Ok(BuiltEncounter {
            sim,
            casts,
            duration: Duration::from_secs_f64(self.duration),
        })
    }
}

/// Attach the cast behavior described by `spec` to its definition
fn spell_config(spec: &SpellSpec) -> SpellConfig {
    let base = spec.base;
    let applier = spec.outcome.applier();
    let config = SpellConfig::new(spec.definition.clone());

    match spec.effect {
        EffectKind::Damage => config.with_effects(move |sim: &mut Simulation, spell: SpellId, target: UnitIndex| {
            let id = sim.calc_damage(spell, target, base, applier);
            sim.wait_travel_time(spell, move |sim: &mut Simulation| {
                sim.deal_damage(spell, id);
            });
        }),
        EffectKind::Healing => config.with_effects(move |sim: &mut Simulation, spell: SpellId, target: UnitIndex| {
            sim.calc_and_deal_healing(spell, target, base, applier);
        }),
        EffectKind::PeriodicDamage | EffectKind::PeriodicHealing => {
            let healing = spec.effect == EffectKind::PeriodicHealing;
            let ticks = spec.ticks;
            let tick_length = Duration::from_secs_f64(spec.tick_length);
            config.with_effects(move |sim: &mut Simulation, spell: SpellId, target: UnitIndex| {
                let mut dot = Dot::new(spell, target, ticks, tick_length, applier);
                if healing {
                    dot.snapshot_healing(sim, base);
                } else {
                    dot.snapshot(sim, base);
                }
                dot.schedule_ticks(sim);
            })
        }
    }
}
