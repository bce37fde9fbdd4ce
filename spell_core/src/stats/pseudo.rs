//! PseudoStats - multipliers and bonuses that are not ratings
//!
//! Every multiplier defaults to 1.0 and every bonus to 0.0, so a unit
//! built with `PseudoStats::default()` leaves the pipeline unchanged.

use crate::types::SchoolTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PseudoStats {
    // === Attacker side ===
    pub damage_dealt_multiplier: f64,
    pub school_damage_dealt_multiplier: SchoolTable<f64>,
    pub healing_dealt_multiplier: f64,
    pub threat_multiplier: f64,
    pub mob_type_attack_power: f64,
    pub mob_type_spell_power: f64,
    /// Flat weapon damage bonus
    pub bonus_damage: f64,
    /// Parry and block only apply to attacks from the front
    pub in_front_of_target: bool,

    // === Target side ===
    pub damage_taken_multiplier: f64,
    pub school_damage_taken_multiplier: SchoolTable<f64>,
    pub periodic_physical_damage_taken_multiplier: f64,
    pub disease_damage_taken_multiplier: f64,
    pub healing_taken_multiplier: f64,
    pub bonus_physical_damage_taken: f64,
    pub bonus_ranged_attack_power_taken: f64,

    // === Ratings granted to attackers ===
    pub bonus_crit_rating_taken: f64,
    pub bonus_spell_crit_rating_taken: f64,
    pub bonus_melee_hit_rating_taken: f64,
    pub bonus_spell_hit_rating_taken: f64,
}

impl Default for PseudoStats {
    fn default() -> Self {
        PseudoStats {
            damage_dealt_multiplier: 1.0,
            school_damage_dealt_multiplier: SchoolTable::identity(),
            healing_dealt_multiplier: 1.0,
            threat_multiplier: 1.0,
            mob_type_attack_power: 0.0,
            mob_type_spell_power: 0.0,
            bonus_damage: 0.0,
            in_front_of_target: false,

            damage_taken_multiplier: 1.0,
            school_damage_taken_multiplier: SchoolTable::identity(),
            periodic_physical_damage_taken_multiplier: 1.0,
            disease_damage_taken_multiplier: 1.0,
            healing_taken_multiplier: 1.0,
            bonus_physical_damage_taken: 0.0,
            bonus_ranged_attack_power_taken: 0.0,

            bonus_crit_rating_taken: 0.0,
            bonus_spell_crit_rating_taken: 0.0,
            bonus_melee_hit_rating_taken: 0.0,
            bonus_spell_hit_rating_taken: 0.0,
        }
    }
}
