//! Armor - physical damage reduction

use crate::config::ArmorConstants;

/// Armor constant K for an attacker level, floored so it stays positive
pub fn armor_constant(attacker_level: u32, constants: &ArmorConstants) -> f64 {
    (constants.constant_slope * attacker_level as f64 - constants.constant_offset)
        .max(constants.min_constant)
}

/// Damage multiplier from armor
///
/// `multiplier = 1 - A / (A + K)` where `A` is the armor left after
/// penetration.
///
/// # Arguments
/// * `armor` - The defender's armor
/// * `penetration` - Fraction of armor ignored, 0..=1
/// * `constant` - K for the attacker's level
pub fn armor_multiplier(armor: f64, penetration: f64, constant: f64) -> f64 {
    let effective = armor * (1.0 - penetration.clamp(0.0, 1.0));
    if effective <= 0.0 {
        return 1.0;
    }
    1.0 - effective / (effective + constant)
}
