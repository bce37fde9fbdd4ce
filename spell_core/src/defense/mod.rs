//! Defense - armor and partial resists
//!
//! This is the resistance stage of the damage pipeline: it runs after the
//! target multipliers and before the outcome roll.

mod armor;
mod resistance;

pub use armor::{armor_constant, armor_multiplier};
pub use resistance::{average_resist, partial_resist_quarters, resist_multiplier};

use crate::outcome::{HitOutcome, OutcomeContext};
use crate::roll::RollPurpose;
use crate::spell::{SpellFlags, SpellResult};
use crate::stats::Stat;
use crate::types::School;

/// Scale `result` by the defender's armor or magic resistance
///
/// Physical hits use armor; periodic physical damage ignores it. Magic
/// schools roll a partial resist and tag the outcome with it. Holy, binary
/// spells and spells that ignore resistances pass through untouched.
pub fn apply_resistances(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult, periodic: bool) {
    let spell = ctx.spell;
    if spell.flags.matches(SpellFlags::IGNORE_RESISTANCES) {
        return;
    }

    match spell.school {
        School::Physical => {
            if periodic {
                return;
            }
            let penetration = spell.armor_penetration(ctx.attacker, &ctx.constants.ratings);
            let multiplier = armor_multiplier(
                ctx.defender.stats[Stat::Armor],
                penetration,
                ctx.table.armor_constant,
            );
            result.resistance_multiplier = multiplier;
            result.damage *= multiplier;
        }
        School::Holy => {}
        school => {
            if spell.flags.matches(SpellFlags::BINARY) {
                return;
            }
            let average = average_resist(
                ctx.defender.resistance(school),
                ctx.attacker.level,
                &ctx.constants.resistance,
            );
            if average <= 0.0 {
                return;
            }

            let quarters = partial_resist_quarters(average, ctx.rolls.roll(RollPurpose::PartialResist));
            let multiplier = resist_multiplier(quarters);
            result.resistance_multiplier = multiplier;
            result.damage *= multiplier;
            result.outcome |= HitOutcome::partial_resist(quarters);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack_table::AttackTable;
    use crate::config::CombatConstants;
    use crate::roll::FixedRolls;
    use crate::spell::{ProcMask, Spell, SpellConfig, SpellDefinition};
    use crate::stats::Stats;
    use crate::types::{ActionId, SpellId, UnitIndex, UnitKind};
    use crate::unit::Unit;

    fn run(school: School, flags: SpellFlags, defender: &Unit, roll: f64, periodic: bool) -> SpellResult {
        let def = SpellDefinition {
            action_id: ActionId::spell(7),
            school,
            flags,
            proc_mask: ProcMask::SPELL_DAMAGE,
            damage_multiplier: 1.0,
            ..Default::default()
        };
        let spell = Spell::from_config(SpellId(0), UnitIndex(0), SpellConfig::new(def)).unwrap();
        let attacker = Unit::new(UnitIndex(0), "Caster", UnitKind::Player, 80);
        let constants = CombatConstants::default();
        let table = AttackTable::new(&attacker, defender, &constants);
        let mut rolls = FixedRolls::constant(roll);
        let mut ctx = OutcomeContext {
            spell: &spell,
            attacker: &attacker,
            defender,
            table: &table,
            constants: &constants,
            rolls: &mut rolls,
        };
        let mut result = SpellResult::new(defender.index, 1000.0);
        apply_resistances(&mut ctx, &mut result, periodic);
        result
    }

    fn armored_boss() -> Unit {
        Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83)
            .with_stats(Stats::new().with(Stat::Armor, 15232.5))
    }

    #[test]
    fn test_physical_armor() {
        let result = run(School::Physical, SpellFlags::empty(), &armored_boss(), 0.0, false);
        assert!((result.resistance_multiplier - 0.5).abs() < 1e-12);
        assert!((result.damage - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_bleeds_ignore_armor() {
        let result = run(School::Physical, SpellFlags::empty(), &armored_boss(), 0.0, true);
        assert!((result.damage - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_resist_tags_outcome() {
        let mut boss = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);
        boss.resistances[School::Fire] = 400.0;

        // average 0.5 -> exactly two quarters
        let result = run(School::Fire, SpellFlags::empty(), &boss, 0.99, false);
        assert_eq!(result.outcome, HitOutcome::PARTIAL_2_4);
        assert!((result.damage - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skipped_resistances() {
        let mut boss = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);
        boss.resistances[School::Fire] = 400.0;
        boss.resistances[School::Holy] = 400.0;

        for (school, flags) in [
            (School::Fire, SpellFlags::IGNORE_RESISTANCES),
            (School::Fire, SpellFlags::BINARY),
            (School::Holy, SpellFlags::empty()),
        ] {
            let result = run(school, flags, &boss, 0.0, false);
            assert!((result.damage - 1000.0).abs() < f64::EPSILON);
            assert_eq!(result.outcome, HitOutcome::EMPTY);
        }
    }
}
