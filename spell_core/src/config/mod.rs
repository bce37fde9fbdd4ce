//! Configuration loading from TOML files

mod constants;
mod spells;

pub use constants::{
    ArmorConstants, CombatConstants, EnemyTableConstants, LevelTable, PlayerTableConstants,
    RatingConversions, ResistanceConstants, CHARACTER_LEVEL,
};
pub use spells::{load_spell_definitions, parse_spell_definitions, SpellsConfig};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load combat constants, falling back to defaults for anything unset
pub fn load_constants(path: &Path) -> Result<CombatConstants, ConfigError> {
    let constants: CombatConstants = load_toml(path)?;
    validate_constants(&constants)?;
    Ok(constants)
}

/// Every constant the pipeline divides by must be positive
pub fn validate_constants(constants: &CombatConstants) -> Result<(), ConfigError> {
    let divisors = [
        ("ratings.melee_hit_rating_per_hit_chance", constants.ratings.melee_hit_rating_per_hit_chance),
        ("ratings.spell_hit_rating_per_hit_chance", constants.ratings.spell_hit_rating_per_hit_chance),
        ("ratings.crit_rating_per_crit_chance", constants.ratings.crit_rating_per_crit_chance),
        (
            "ratings.expertise_per_quarter_percent_reduction",
            constants.ratings.expertise_per_quarter_percent_reduction,
        ),
        ("ratings.armor_pen_per_percent_armor", constants.ratings.armor_pen_per_percent_armor),
        ("armor.min_constant", constants.armor.min_constant),
        ("resistance.per_level", constants.resistance.per_level),
    ];
    for (name, value) in divisors {
        if value <= 0.0 || !value.is_finite() {
            return Err(ConfigError::ValidationError(format!("{name} must be positive, got {value}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_constants_keep_defaults() {
        let constants: CombatConstants = parse_toml("[ratings]\ncrit_rating_per_crit_chance = 22.0\n").unwrap();
        assert!((constants.ratings.crit_rating_per_crit_chance - 22.0).abs() < f64::EPSILON);
        assert!(
            (constants.ratings.spell_hit_rating_per_hit_chance
                - CombatConstants::default().ratings.spell_hit_rating_per_hit_chance)
                .abs()
                < f64::EPSILON
        );
        assert!(validate_constants(&constants).is_ok());
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let constants: CombatConstants = parse_toml("[resistance]\nper_level = 0.0\n").unwrap();
        let err = validate_constants(&constants).unwrap_err();
        assert!(err.to_string().contains("resistance.per_level"));
    }
}
