//! Per attacker/defender attack tables
//!
//! A table holds the base avoidance chances for one pairing plus the
//! pair-specific multipliers that debuffs on the defender write into.
//! Chances depend only on levels and unit kinds, so tables are rebuilt when
//! the roster changes and otherwise only their multipliers move.

use crate::config::CombatConstants;
use crate::defense::armor_constant;
use crate::types::{UnitIndex, UnitKind};
use crate::unit::Unit;

#[derive(Debug, Clone, PartialEq)]
pub struct AttackTable {
    pub attacker: UnitIndex,
    pub defender: UnitIndex,

    pub base_miss_chance: f64,
    pub base_spell_miss_chance: f64,
    pub base_dodge_chance: f64,
    pub base_parry_chance: f64,
    pub base_block_chance: f64,
    pub base_glance_chance: f64,
    pub base_crush_chance: f64,

    pub glance_multiplier: f64,
    pub crush_multiplier: f64,
    /// Subtracted from physical crit chance after rating conversion
    pub crit_suppression: f64,
    /// Armor constant for the attacker's level
    pub armor_constant: f64,

    pub damage_dealt_multiplier: f64,
    pub damage_taken_multiplier: f64,
    pub healing_dealt_multiplier: f64,
    pub nature_damage_taken_multiplier: f64,
    pub periodic_shadow_damage_taken_multiplier: f64,
}

impl AttackTable {
    pub fn new(attacker: &Unit, defender: &Unit, constants: &CombatConstants) -> Self {
        let level_delta = defender.level as i64 - attacker.level as i64;
        let armor_constant = armor_constant(attacker.level, &constants.armor);

        let mut table = AttackTable {
            attacker: attacker.index,
            defender: defender.index,
            base_miss_chance: 0.0,
            base_spell_miss_chance: 0.0,
            base_dodge_chance: 0.0,
            base_parry_chance: 0.0,
            base_block_chance: 0.0,
            base_glance_chance: 0.0,
            base_crush_chance: 0.0,
            glance_multiplier: 1.0,
            crush_multiplier: 1.0,
            crit_suppression: 0.0,
            armor_constant,
            damage_dealt_multiplier: 1.0,
            damage_taken_multiplier: 1.0,
            healing_dealt_multiplier: 1.0,
            nature_damage_taken_multiplier: 1.0,
            periodic_shadow_damage_taken_multiplier: 1.0,
        };

        if defender.kind == UnitKind::Enemy {
            let enemy = &constants.enemy_table;
            table.base_miss_chance = enemy.miss_chance.at(level_delta);
            table.base_spell_miss_chance = enemy.spell_miss_chance.at(level_delta);
            table.base_dodge_chance = enemy.dodge_chance.at(level_delta);
            table.base_parry_chance = enemy.parry_chance.at(level_delta);
            table.base_block_chance = enemy.block_chance;
            table.base_glance_chance = enemy.glance_chance.at(level_delta);
            table.glance_multiplier = enemy.glance_multiplier.at(level_delta);
            table.crit_suppression = enemy.crit_suppression.at(level_delta);
        } else {
            let player = &constants.player_table;
            table.base_miss_chance = player.miss_chance;
            table.base_spell_miss_chance = constants.enemy_table.spell_miss_chance.at(level_delta);
            table.base_dodge_chance = player.dodge_chance;
            table.base_parry_chance = player.parry_chance;
            table.base_block_chance = player.block_chance;
            // Crushing blows come from attackers above the defender
            table.base_crush_chance = player.crush_chance.at(-level_delta);
            table.crush_multiplier = player.crush_multiplier;
        }

        table
    }
}

/// Every attacker/defender pairing of a roster, stored row-major by attacker
#[derive(Debug, Clone, Default)]
pub struct AttackTables {
    tables: Vec<AttackTable>,
    num_units: usize,
}

impl AttackTables {
    pub fn build(units: &[Unit], constants: &CombatConstants) -> Self {
        let mut tables = Vec::with_capacity(units.len() * units.len());
        for attacker in units {
            for defender in units {
                tables.push(AttackTable::new(attacker, defender, constants));
            }
        }
        AttackTables {
            tables,
            num_units: units.len(),
        }
    }

    /// Recompute every table, discarding pair-specific multipliers
    pub fn rebuild(&mut self, units: &[Unit], constants: &CombatConstants) {
        *self = Self::build(units, constants);
    }

    pub fn num_units(&self) -> usize {
        self.num_units
    }

    pub fn get(&self, attacker: UnitIndex, defender: UnitIndex) -> &AttackTable {
        &self.tables[attacker.0 * self.num_units + defender.0]
    }

    pub fn get_mut(&mut self, attacker: UnitIndex, defender: UnitIndex) -> &mut AttackTable {
        &mut self.tables[attacker.0 * self.num_units + defender.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_vs_boss_table() {
        let constants = CombatConstants::default();
        let player = Unit::new(UnitIndex(0), "Player", UnitKind::Player, 80);
        let boss = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);

        let table = AttackTable::new(&player, &boss, &constants);
        assert!((table.base_spell_miss_chance - 0.17).abs() < f64::EPSILON);
        assert!((table.base_miss_chance - 0.08).abs() < f64::EPSILON);
        assert!((table.crit_suppression - 0.048).abs() < f64::EPSILON);
        assert!((table.glance_multiplier - 0.75).abs() < f64::EPSILON);
        assert!((table.base_crush_chance - 0.0).abs() < f64::EPSILON);
        assert!((table.armor_constant - 15232.5).abs() < 1e-9);
    }

    #[test]
    fn test_boss_vs_player_can_crush() {
        let constants = CombatConstants::default();
        let player = Unit::new(UnitIndex(0), "Tank", UnitKind::Player, 80);
        let boss = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);

        let table = AttackTable::new(&boss, &player, &constants);
        assert!((table.base_crush_chance - 0.15).abs() < f64::EPSILON);
        assert!((table.crush_multiplier - 1.5).abs() < f64::EPSILON);
        assert!((table.base_glance_chance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tables_indexed_by_pair() {
        let constants = CombatConstants::default();
        let units = vec![
            Unit::new(UnitIndex(0), "A", UnitKind::Player, 80),
            Unit::new(UnitIndex(1), "B", UnitKind::Enemy, 83),
            Unit::new(UnitIndex(2), "C", UnitKind::Enemy, 80),
        ];

        let mut tables = AttackTables::build(&units, &constants);
        assert_eq!(tables.num_units(), 3);

        let table = tables.get(UnitIndex(0), UnitIndex(2));
        assert_eq!(table.attacker, UnitIndex(0));
        assert_eq!(table.defender, UnitIndex(2));

        tables.get_mut(UnitIndex(0), UnitIndex(1)).damage_taken_multiplier = 1.3;
        tables.rebuild(&units, &constants);
        assert!((tables.get(UnitIndex(0), UnitIndex(1)).damage_taken_multiplier - 1.0).abs() < f64::EPSILON);
    }
}
