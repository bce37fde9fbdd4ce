//! Resistance - partial resists for magic schools
//!
//! A target's resistance sets an average resisted fraction. Each hit then
//! resists a whole number of quarters, chosen so the expected fraction
//! equals that average:
//! - `average = R / (R + per_level * attacker_level)`, capped
//! - `x = 4 * average`; resist `floor(x)` quarters, plus one more with
//!   probability `x - floor(x)`

use crate::config::ResistanceConstants;

/// Average fraction of damage resisted
pub fn average_resist(resistance: f64, attacker_level: u32, constants: &ResistanceConstants) -> f64 {
    if resistance <= 0.0 {
        return 0.0;
    }
    let average = resistance / (resistance + constants.per_level * attacker_level as f64);
    average.min(constants.max_average_resist)
}

/// Quarters resisted for one hit, given a uniform roll in [0, 1)
pub fn partial_resist_quarters(average: f64, roll: f64) -> u8 {
    let x = (average * 4.0).clamp(0.0, 3.0);
    let whole = x.floor();
    let extra = if roll < x - whole { 1.0 } else { 0.0 };
    (whole + extra).min(3.0) as u8
}

/// Damage multiplier for a number of resisted quarters
pub fn resist_multiplier(quarters: u8) -> f64 {
    1.0 - quarters as f64 / 4.0
}
