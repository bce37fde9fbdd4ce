//! spell_sim - Monte-Carlo trial runner for spell_core encounters
//!
//! Loads a TOML scenario, runs it for many seeded iterations in parallel and
//! aggregates per-action damage, threat and outcome counts.

pub mod runner;
pub mod scenario;
pub mod summary;

pub use runner::{run_iteration, run_trials, ActionTotals, IterationResult};
pub use scenario::{BuiltEncounter, Scenario, ScenarioError, ScheduledCast};
pub use summary::{ActionSummary, Spread, TrialSummary};
