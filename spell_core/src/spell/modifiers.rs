//! Attacker-side and target-side multipliers
//!
//! Attacker multipliers are what a periodic effect snapshots; target
//! multipliers are read live on every hit and tick.

use super::{Spell, SpellFlags};
use crate::attack_table::AttackTable;
use crate::types::School;
use crate::unit::Unit;

impl Spell {
    /// Combined attacker-side damage multiplier
    pub fn attacker_damage_multiplier(&self, attacker: &Unit, table: &AttackTable) -> f64 {
        // Spell multipliers apply even when attacker modifiers are ignored
        let multiplier = self.damage_multiplier * self.damage_multiplier_additive;
        if self.flags.matches(SpellFlags::IGNORE_ATTACKER_MODIFIERS) {
            return multiplier;
        }

        let ps = &attacker.pseudo;
        multiplier
            * ps.damage_dealt_multiplier
            * table.damage_dealt_multiplier
            * ps.school_damage_dealt_multiplier[self.school]
    }

    /// Flat damage added before target multipliers
    pub fn target_bonus_damage(&self, defender: &Unit) -> f64 {
        if self.flags.matches(SpellFlags::IGNORE_TARGET_MODIFIERS) {
            return 0.0;
        }
        if self.school.is_physical() && self.flags.matches(SpellFlags::INCLUDE_TARGET_BONUS_DAMAGE) {
            defender.pseudo.bonus_physical_damage_taken
        } else {
            0.0
        }
    }

    /// Combined target-side damage multiplier
    pub fn target_damage_multiplier(&self, defender: &Unit, table: &AttackTable, periodic: bool) -> f64 {
        if self.flags.matches(SpellFlags::IGNORE_TARGET_MODIFIERS) {
            return 1.0;
        }

        let ps = &defender.pseudo;
        let mut multiplier = table.damage_taken_multiplier
            * ps.damage_taken_multiplier
            * ps.school_damage_taken_multiplier[self.school];

        if self.flags.matches(SpellFlags::DISEASE) {
            multiplier *= ps.disease_damage_taken_multiplier;
        }

        match self.school {
            School::Physical if periodic => multiplier *= ps.periodic_physical_damage_taken_multiplier,
            School::Nature => multiplier *= table.nature_damage_taken_multiplier,
            School::Shadow if periodic => multiplier *= table.periodic_shadow_damage_taken_multiplier,
            _ => {}
        }

        multiplier
    }

    /// Caster-side healing multiplier
    pub fn caster_healing_multiplier(&self, caster: &Unit) -> f64 {
        if self.flags.matches(SpellFlags::IGNORE_ATTACKER_MODIFIERS) {
            return 1.0;
        }
        caster.pseudo.healing_dealt_multiplier * self.damage_multiplier * self.damage_multiplier_additive
    }

    /// Target-side healing multiplier
    pub fn target_healing_multiplier(&self, target: &Unit, table: &AttackTable) -> f64 {
        if self.flags.matches(SpellFlags::IGNORE_TARGET_MODIFIERS) {
            return 1.0;
        }
        target.pseudo.healing_taken_multiplier * table.healing_dealt_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ProcMask, SpellConfig, SpellDefinition};
    use super::*;
    use crate::config::CombatConstants;
    use crate::types::{ActionId, SpellId, UnitIndex, UnitKind};

    fn setup(school: School, flags: SpellFlags) -> (Spell, Unit, Unit, AttackTable) {
        let def = SpellDefinition {
            action_id: ActionId::spell(1),
            school,
            flags,
            proc_mask: ProcMask::SPELL_DAMAGE,
            damage_multiplier: 1.2,
            ..Default::default()
        };
        let spell = Spell::from_config(SpellId(0), UnitIndex(0), SpellConfig::new(def)).unwrap();
        let attacker = Unit::new(UnitIndex(0), "Caster", UnitKind::Player, 80);
        let defender = Unit::new(UnitIndex(1), "Target", UnitKind::Enemy, 83);
        let table = AttackTable::new(&attacker, &defender, &CombatConstants::default());
        (spell, attacker, defender, table)
    }

    #[test]
    fn test_attacker_multiplier_stacks_school() {
        let (spell, mut attacker, _, mut table) = setup(School::Fire, SpellFlags::empty());
        attacker.pseudo.damage_dealt_multiplier = 1.1;
        attacker.pseudo.school_damage_dealt_multiplier[School::Fire] = 1.05;
        attacker.pseudo.school_damage_dealt_multiplier[School::Frost] = 3.0;
        table.damage_dealt_multiplier = 1.02;

        let expected = 1.2 * 1.1 * 1.02 * 1.05;
        assert!((spell.attacker_damage_multiplier(&attacker, &table) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ignore_attacker_modifiers_keeps_spell_multiplier() {
        let (spell, mut attacker, _, table) = setup(School::Fire, SpellFlags::IGNORE_ATTACKER_MODIFIERS);
        attacker.pseudo.damage_dealt_multiplier = 2.0;
        assert!((spell.attacker_damage_multiplier(&attacker, &table) - 1.2).abs() < 1e-12);
        assert!((spell.caster_healing_multiplier(&attacker) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_periodic_shadow_uses_table_multiplier() {
        let (spell, _, defender, mut table) = setup(School::Shadow, SpellFlags::empty());
        table.periodic_shadow_damage_taken_multiplier = 1.2;

        assert!((spell.target_damage_multiplier(&defender, &table, false) - 1.0).abs() < 1e-12);
        assert!((spell.target_damage_multiplier(&defender, &table, true) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_disease_and_nature_multipliers() {
        let (spell, _, mut defender, mut table) = setup(School::Nature, SpellFlags::DISEASE);
        defender.pseudo.disease_damage_taken_multiplier = 1.3;
        defender.pseudo.school_damage_taken_multiplier[School::Nature] = 1.1;
        table.nature_damage_taken_multiplier = 1.5;

        let expected = 1.3 * 1.1 * 1.5;
        assert!((spell.target_damage_multiplier(&defender, &table, false) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bonus_damage_only_for_flagged_physical() {
        let (spell, _, mut defender, _) = setup(School::Physical, SpellFlags::INCLUDE_TARGET_BONUS_DAMAGE);
        defender.pseudo.bonus_physical_damage_taken = 130.0;
        assert!((spell.target_bonus_damage(&defender) - 130.0).abs() < f64::EPSILON);

        let (spell, _, _, _) = setup(School::Fire, SpellFlags::INCLUDE_TARGET_BONUS_DAMAGE);
        assert!((spell.target_bonus_damage(&defender) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_healing_target_multiplier() {
        let (spell, _, mut target, mut table) = setup(School::Holy, SpellFlags::empty());
        target.pseudo.healing_taken_multiplier = 1.2;
        table.healing_dealt_multiplier = 1.1;
        assert!((spell.target_healing_multiplier(&target, &table) - 1.32).abs() < 1e-12);
    }
}
