//! Optional combat log
//!
//! When a simulation carries a [`CombatLog`], every calculation records the
//! running value after each pipeline stage and every deal records a line.
//! Recording only reads values the pipeline already computed.

use crate::spell::SpellResult;
use crate::types::{ActionId, UnitIndex};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Intermediate values of one calculation, in pipeline order
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineTrace {
    pub at: Duration,
    pub action: ActionId,
    pub attacker: UnitIndex,
    pub target: UnitIndex,
    pub healing: bool,
    pub base: f64,
    pub after_attacker: f64,
    pub after_target: f64,
    /// Same as `after_target` for healing
    pub after_resistance: f64,
    pub after_outcome: f64,
    /// Same as `after_outcome` for healing
    pub after_post_outcome: f64,
}

/// A dealt result
#[derive(Debug, Clone, PartialEq)]
pub struct DealEntry {
    pub at: Duration,
    pub action: ActionId,
    pub attacker: UnitIndex,
    pub target_label: String,
    pub periodic: bool,
    pub healing: bool,
    pub result: SpellResult,
    pub threat: f64,
}

impl fmt::Display for DealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.healing {
            self.result.healing_string()
        } else {
            self.result.damage_string()
        };
        let tick = if self.periodic { " tick" } else { "" };
        write!(
            f,
            "{} {}{} {}. (Threat: {:.3})",
            self.target_label, self.action, tick, text, self.threat
        )
    }
}

/// Free-form line, used for cast events
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub at: Duration,
    pub unit: UnitIndex,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    pub traces: Vec<PipelineTrace>,
    pub deals: Vec<DealEntry>,
    pub lines: Vec<LogLine>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trace(&mut self, trace: PipelineTrace) {
        debug!(
            target: "spell_core::pipeline",
            at = ?trace.at,
            action = %trace.action,
            target_unit = trace.target.0,
            healing = trace.healing,
            base = trace.base,
            after_attacker = trace.after_attacker,
            after_target = trace.after_target,
            after_resistance = trace.after_resistance,
            after_outcome = trace.after_outcome,
            after_post_outcome = trace.after_post_outcome,
            "calc"
        );
        self.traces.push(trace);
    }

    pub fn record_deal(&mut self, entry: DealEntry) {
        debug!(target: "spell_core::pipeline", at = ?entry.at, "{}", entry);
        self.deals.push(entry);
    }

    pub fn record_line(&mut self, at: Duration, unit: UnitIndex, message: String) {
        debug!(target: "spell_core::pipeline", at = ?at, unit = unit.0, "{}", message);
        self.lines.push(LogLine { at, unit, message });
    }

    pub fn clear(&mut self) {
        self.traces.clear();
        self.deals.clear();
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty() && self.deals.is_empty() && self.lines.is_empty()
    }
}
