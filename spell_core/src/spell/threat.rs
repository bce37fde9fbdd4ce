//! Threat from a finished result

use super::{Spell, SpellResult};

impl SpellResult {
    /// Threat generated by this result. Zero unless the result landed.
    ///
    /// `(damage * spell multiplier * dynamic multiplier + flat bonus + dynamic bonus)
    /// * attacker threat multiplier`
    pub fn calc_threat(&self, spell: &Spell, attacker_threat_multiplier: f64) -> f64 {
        if !self.landed() {
            return 0.0;
        }

        let mut flat_bonus = spell.flat_threat_bonus;
        if let Some(bonus) = spell.dynamic_threat_bonus {
            flat_bonus += bonus(self, spell);
        }

        let dynamic_multiplier = spell
            .dynamic_threat_multiplier
            .map_or(1.0, |multiplier| multiplier(self, spell));

        (self.damage * spell.threat_multiplier * dynamic_multiplier + flat_bonus)
            * attacker_threat_multiplier
    }
}
