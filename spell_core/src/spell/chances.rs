//! Power and chance accessors
//!
//! Ratings are summed from the caster's stats, the spell's own bonus
//! ratings and whatever the target grants its attackers, then converted to
//! a probability with the configured rating constants.

use super::Spell;
use crate::attack_table::AttackTable;
use crate::config::RatingConversions;
use crate::stats::Stat;
use crate::unit::Unit;

impl Spell {
    pub fn melee_attack_power(&self, attacker: &Unit) -> f64 {
        attacker.stats[Stat::AttackPower] + attacker.pseudo.mob_type_attack_power
    }

    pub fn ranged_attack_power(&self, attacker: &Unit, target: &Unit) -> f64 {
        attacker.stats[Stat::RangedAttackPower]
            + attacker.pseudo.mob_type_attack_power
            + target.pseudo.bonus_ranged_attack_power_taken
    }

    pub fn bonus_weapon_damage(&self, attacker: &Unit) -> f64 {
        attacker.pseudo.bonus_damage
    }

    pub fn spell_power(&self, attacker: &Unit) -> f64 {
        attacker.stats[Stat::SpellPower] + self.bonus_spell_power + attacker.pseudo.mob_type_spell_power
    }

    pub fn healing_power(&self, attacker: &Unit) -> f64 {
        self.spell_power(attacker)
    }

    /// Dodge and parry reduction from expertise, in whole quarter percents
    pub fn expertise_percentage(&self, attacker: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::Expertise] + self.bonus_expertise_rating;
        (rating / ratings.expertise_per_quarter_percent_reduction).floor() / 400.0
    }

    /// Fraction of the target's armor ignored
    pub fn armor_penetration(&self, attacker: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::ArmorPenetration] + self.bonus_armor_pen_rating;
        (rating / (ratings.armor_pen_per_percent_armor * 100.0)).clamp(0.0, 1.0)
    }

    pub fn physical_hit_chance(&self, attacker: &Unit, target: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::MeleeHit]
            + self.bonus_hit_rating
            + target.pseudo.bonus_melee_hit_rating_taken;
        rating / (ratings.melee_hit_rating_per_hit_chance * 100.0)
    }

    /// Crit chance after the table's crit suppression
    pub fn physical_crit_chance(
        &self,
        attacker: &Unit,
        target: &Unit,
        table: &AttackTable,
        ratings: &RatingConversions,
    ) -> f64 {
        let rating = attacker.stats[Stat::MeleeCrit]
            + self.bonus_crit_rating
            + target.pseudo.bonus_crit_rating_taken;
        rating / (ratings.crit_rating_per_crit_chance * 100.0) - table.crit_suppression
    }

    pub fn spell_hit_chance(&self, attacker: &Unit, target: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::SpellHit]
            + self.bonus_hit_rating
            + target.pseudo.bonus_spell_hit_rating_taken;
        rating / (ratings.spell_hit_rating_per_hit_chance * 100.0)
    }

    pub fn spell_crit_chance(&self, attacker: &Unit, target: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::SpellCrit]
            + self.bonus_crit_rating
            + target.pseudo.bonus_crit_rating_taken
            + target.pseudo.bonus_spell_crit_rating_taken;
        rating / (ratings.crit_rating_per_crit_chance * 100.0)
    }

    /// Healing crits ignore anything granted by the target
    pub fn healing_crit_chance(&self, attacker: &Unit, ratings: &RatingConversions) -> f64 {
        let rating = attacker.stats[Stat::SpellCrit] + self.bonus_crit_rating;
        rating / (ratings.crit_rating_per_crit_chance * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ProcMask, SpellConfig, SpellDefinition};
    use super::*;
    use crate::config::CombatConstants;
    use crate::stats::Stats;
    use crate::types::{ActionId, SpellId, UnitIndex, UnitKind};

    fn spell(bonus_crit_rating: f64) -> Spell {
        let def = SpellDefinition {
            action_id: ActionId::spell(1),
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            bonus_crit_rating,
            ..Default::default()
        };
        Spell::from_config(SpellId(0), UnitIndex(0), SpellConfig::new(def)).unwrap()
    }

    #[test]
    fn test_physical_crit_suppressed() {
        let constants = CombatConstants::default();
        let ratings = &constants.ratings;
        let attacker = Unit::new(UnitIndex(0), "Warrior", UnitKind::Player, 80)
            .with_stats(Stats::new().with(Stat::MeleeCrit, ratings.crit_rating_per_crit_chance * 25.0));
        let boss = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);
        let table = AttackTable::new(&attacker, &boss, &constants);

        let chance = spell(0.0).physical_crit_chance(&attacker, &boss, &table, ratings);
        assert!((chance - (0.25 - 0.048)).abs() < 1e-12);
    }

    #[test]
    fn test_spell_crit_includes_target_bonuses() {
        let ratings = RatingConversions::default();
        let attacker = Unit::new(UnitIndex(0), "Mage", UnitKind::Player, 80);
        let mut target = Unit::new(UnitIndex(1), "Boss", UnitKind::Enemy, 83);
        target.pseudo.bonus_spell_crit_rating_taken = ratings.crit_rating_per_crit_chance * 5.0;

        let s = spell(ratings.crit_rating_per_crit_chance * 10.0);
        assert!((s.spell_crit_chance(&attacker, &target, &ratings) - 0.15).abs() < 1e-12);
        assert!((s.healing_crit_chance(&attacker, &ratings) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_expertise_rounds_down_to_quarter_percent() {
        let ratings = RatingConversions::default();
        let attacker = Unit::new(UnitIndex(0), "Rogue", UnitKind::Player, 80)
            .with_stats(Stats::new().with(Stat::Expertise, ratings.expertise_per_quarter_percent_reduction * 10.5));

        // 10 whole quarter percents
        assert!((spell(0.0).expertise_percentage(&attacker, &ratings) - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_armor_penetration_capped() {
        let ratings = RatingConversions::default();
        let attacker = Unit::new(UnitIndex(0), "Hunter", UnitKind::Player, 80)
            .with_stats(Stats::new().with(Stat::ArmorPenetration, 1.0e6));
        assert!((spell(0.0).armor_penetration(&attacker, &ratings) - 1.0).abs() < f64::EPSILON);
    }
}
