//! Spell definition loading

use super::ConfigError;
use crate::spell::SpellDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for spell definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellsConfig {
    #[serde(default)]
    pub spells: Vec<SpellDefinition>,
}

/// Load spell definitions from a TOML file
pub fn load_spell_definitions(path: &Path) -> Result<Vec<SpellDefinition>, ConfigError> {
    let config: SpellsConfig = super::load_toml(path)?;
    validate(config)
}

/// Load spell definitions from a TOML string
pub fn parse_spell_definitions(content: &str) -> Result<Vec<SpellDefinition>, ConfigError> {
    let config: SpellsConfig = super::parse_toml(content)?;
    validate(config)
}

fn validate(config: SpellsConfig) -> Result<Vec<SpellDefinition>, ConfigError> {
    let mut seen = HashSet::new();
    for spell in &config.spells {
        if !seen.insert(spell.action_id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate spell definition for {}",
                spell.action_id
            )));
        }
    }
    Ok(config.spells)
}
