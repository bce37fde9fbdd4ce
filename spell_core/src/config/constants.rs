//! Combat constants configuration

use serde::{Deserialize, Serialize};

/// Level of player characters; level tables are indexed by how far a
/// defender is above this
pub const CHARACTER_LEVEL: u32 = 80;

/// Tunable combat constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub ratings: RatingConversions,
    #[serde(default)]
    pub enemy_table: EnemyTableConstants,
    #[serde(default)]
    pub player_table: PlayerTableConstants,
    #[serde(default)]
    pub armor: ArmorConstants,
    #[serde(default)]
    pub resistance: ResistanceConstants,
}

/// Rating points needed for 1% of the matching chance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConversions {
    #[serde(default = "default_melee_hit_rating")]
    pub melee_hit_rating_per_hit_chance: f64,
    #[serde(default = "default_spell_hit_rating")]
    pub spell_hit_rating_per_hit_chance: f64,
    #[serde(default = "default_crit_rating")]
    pub crit_rating_per_crit_chance: f64,
    /// Expertise rating per 0.25% dodge/parry reduction
    #[serde(default = "default_expertise_rating")]
    pub expertise_per_quarter_percent_reduction: f64,
    #[serde(default = "default_armor_pen_rating")]
    pub armor_pen_per_percent_armor: f64,
}

impl Default for RatingConversions {
    fn default() -> Self {
        RatingConversions {
            melee_hit_rating_per_hit_chance: default_melee_hit_rating(),
            spell_hit_rating_per_hit_chance: default_spell_hit_rating(),
            crit_rating_per_crit_chance: default_crit_rating(),
            expertise_per_quarter_percent_reduction: default_expertise_rating(),
            armor_pen_per_percent_armor: default_armor_pen_rating(),
        }
    }
}

fn default_melee_hit_rating() -> f64 {
    32.78998
}
fn default_spell_hit_rating() -> f64 {
    26.231968
}
fn default_crit_rating() -> f64 {
    45.905909
}
fn default_expertise_rating() -> f64 {
    8.1974973
}
fn default_armor_pen_rating() -> f64 {
    15.395298
}

/// A value for each level difference 0..=3 between defender and attacker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTable(pub [f64; 4]);

impl LevelTable {
    /// Look up by level difference, clamped to the table range
    pub fn at(&self, level_delta: i64) -> f64 {
        self.0[level_delta.clamp(0, 3) as usize]
    }
}

/// Base chances when the defender is an enemy unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTableConstants {
    #[serde(default = "default_enemy_miss")]
    pub miss_chance: LevelTable,
    #[serde(default = "default_enemy_spell_miss")]
    pub spell_miss_chance: LevelTable,
    #[serde(default = "default_enemy_dodge")]
    pub dodge_chance: LevelTable,
    #[serde(default = "default_enemy_parry")]
    pub parry_chance: LevelTable,
    #[serde(default = "default_enemy_glance")]
    pub glance_chance: LevelTable,
    #[serde(default = "default_enemy_glance_multiplier")]
    pub glance_multiplier: LevelTable,
    /// Subtracted from crit chance after rating conversion
    #[serde(default = "default_enemy_crit_suppression")]
    pub crit_suppression: LevelTable,
    #[serde(default = "default_block_chance")]
    pub block_chance: f64,
}

impl Default for EnemyTableConstants {
    fn default() -> Self {
        EnemyTableConstants {
            miss_chance: default_enemy_miss(),
            spell_miss_chance: default_enemy_spell_miss(),
            dodge_chance: default_enemy_dodge(),
            parry_chance: default_enemy_parry(),
            glance_chance: default_enemy_glance(),
            glance_multiplier: default_enemy_glance_multiplier(),
            crit_suppression: default_enemy_crit_suppression(),
            block_chance: default_block_chance(),
        }
    }
}

fn default_enemy_miss() -> LevelTable {
    LevelTable([0.05, 0.055, 0.06, 0.08])
}
fn default_enemy_spell_miss() -> LevelTable {
    LevelTable([0.04, 0.05, 0.06, 0.17])
}
fn default_enemy_dodge() -> LevelTable {
    LevelTable([0.05, 0.055, 0.06, 0.065])
}
fn default_enemy_parry() -> LevelTable {
    LevelTable([0.05, 0.055, 0.06, 0.14])
}
fn default_enemy_glance() -> LevelTable {
    LevelTable([0.06, 0.12, 0.18, 0.24])
}
fn default_enemy_glance_multiplier() -> LevelTable {
    LevelTable([0.95, 0.95, 0.85, 0.75])
}
fn default_enemy_crit_suppression() -> LevelTable {
    LevelTable([0.0, 0.01, 0.02, 0.048])
}
fn default_block_chance() -> f64 {
    0.05
}

/// Base chances when the defender is a player or pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTableConstants {
    #[serde(default = "default_player_avoidance")]
    pub miss_chance: f64,
    #[serde(default = "default_player_avoidance")]
    pub dodge_chance: f64,
    #[serde(default = "default_player_avoidance")]
    pub parry_chance: f64,
    #[serde(default = "default_block_chance")]
    pub block_chance: f64,
    /// Indexed by how far the attacker is above the defender
    #[serde(default = "default_crush_chance")]
    pub crush_chance: LevelTable,
    #[serde(default = "default_crush_multiplier")]
    pub crush_multiplier: f64,
}

impl Default for PlayerTableConstants {
    fn default() -> Self {
        PlayerTableConstants {
            miss_chance: default_player_avoidance(),
            dodge_chance: default_player_avoidance(),
            parry_chance: default_player_avoidance(),
            block_chance: default_block_chance(),
            crush_chance: default_crush_chance(),
            crush_multiplier: default_crush_multiplier(),
        }
    }
}

fn default_player_avoidance() -> f64 {
    0.05
}
fn default_crush_chance() -> LevelTable {
    LevelTable([0.0, 0.0, 0.0, 0.15])
}
fn default_crush_multiplier() -> f64 {
    1.5
}

/// Armor formula: `K = slope * attacker_level - offset`,
/// `multiplier = 1 - armor / (armor + K)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorConstants {
    #[serde(default = "default_armor_slope")]
    pub constant_slope: f64,
    #[serde(default = "default_armor_offset")]
    pub constant_offset: f64,
    /// Floor on K so low-level attackers never divide by zero
    #[serde(default = "default_armor_min_constant")]
    pub min_constant: f64,
}

impl Default for ArmorConstants {
    fn default() -> Self {
        ArmorConstants {
            constant_slope: default_armor_slope(),
            constant_offset: default_armor_offset(),
            min_constant: default_armor_min_constant(),
        }
    }
}

fn default_armor_slope() -> f64 {
    467.5
}
fn default_armor_offset() -> f64 {
    22167.5
}
fn default_armor_min_constant() -> f64 {
    400.0
}

/// Magic resistance: `average = R / (R + per_level * attacker_level)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResistanceConstants {
    #[serde(default = "default_resistance_per_level")]
    pub per_level: f64,
    #[serde(default = "default_max_average_resist")]
    pub max_average_resist: f64,
}

impl Default for ResistanceConstants {
    fn default() -> Self {
        ResistanceConstants {
            per_level: default_resistance_per_level(),
            max_average_resist: default_max_average_resist(),
        }
    }
}

fn default_resistance_per_level() -> f64 {
    5.0
}
fn default_max_average_resist() -> f64 {
    0.75
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = CombatConstants::default();
        assert!((constants.ratings.crit_rating_per_crit_chance - 45.905909).abs() < f64::EPSILON);
        assert!((constants.enemy_table.crit_suppression.at(3) - 0.048).abs() < f64::EPSILON);
        assert!((constants.player_table.crush_multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_level_table_clamps() {
        let table = default_enemy_spell_miss();
        assert!((table.at(-2) - 0.04).abs() < f64::EPSILON);
        assert!((table.at(7) - 0.17).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_constants() {
        let toml = r#"
[ratings]
crit_rating_per_crit_chance = 40.0

[enemy_table]
crit_suppression = [0.0, 0.0, 0.0, 0.03]

[armor]
constant_slope = 400.0
"#;

        let constants: CombatConstants = toml::from_str(toml).unwrap();
        assert!((constants.ratings.crit_rating_per_crit_chance - 40.0).abs() < f64::EPSILON);
        assert!((constants.ratings.spell_hit_rating_per_hit_chance - 26.231968).abs() < f64::EPSILON);
        assert!((constants.enemy_table.crit_suppression.at(3) - 0.03).abs() < f64::EPSILON);
        assert!((constants.armor.constant_offset - 22167.5).abs() < f64::EPSILON);
    }
}
