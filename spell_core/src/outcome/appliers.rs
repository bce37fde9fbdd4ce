//! Outcome appliers
//!
//! Each applier picks exactly one primary outcome for a result and applies
//! that outcome's effect on the running damage value. Abilities choose the
//! applier per call, so the eligible outcomes differ per call site.

use super::{HitOutcome, OutcomeBands};
use crate::attack_table::AttackTable;
use crate::config::CombatConstants;
use crate::roll::{RollPurpose, RollSource};
use crate::spell::{Spell, SpellResult};
use crate::stats::Stat;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Everything an applier may read, plus the roll source
pub struct OutcomeContext<'a> {
    pub spell: &'a Spell,
    pub attacker: &'a Unit,
    pub defender: &'a Unit,
    pub table: &'a AttackTable,
    pub constants: &'a CombatConstants,
    pub rolls: &'a mut dyn RollSource,
}

pub type OutcomeApplier = fn(&mut OutcomeContext<'_>, &mut SpellResult);

impl OutcomeContext<'_> {
    /// Spell hit: the roll must clear the remaining miss chance
    pub fn magic_hit_check(&mut self) -> bool {
        let ratings = &self.constants.ratings;
        let miss_chance = self.table.base_spell_miss_chance
            - self.spell.spell_hit_chance(self.attacker, self.defender, ratings);
        self.rolls.roll(RollPurpose::MagicHit) > miss_chance
    }

    pub fn magic_crit_check(&mut self) -> bool {
        let chance = self
            .spell
            .spell_crit_chance(self.attacker, self.defender, &self.constants.ratings);
        self.rolls.roll(RollPurpose::MagicCrit) < chance
    }

    pub fn physical_crit_check(&mut self) -> bool {
        let chance = self.physical_crit_chance();
        self.rolls.roll(RollPurpose::PhysicalCrit) < chance
    }

    pub fn healing_crit_check(&mut self) -> bool {
        let chance = self
            .spell
            .healing_crit_chance(self.attacker, &self.constants.ratings);
        self.rolls.roll(RollPurpose::HealingCrit) < chance
    }

    fn physical_crit_chance(&self) -> f64 {
        self.spell
            .physical_crit_chance(self.attacker, self.defender, self.table, &self.constants.ratings)
    }

    fn melee_miss_chance(&self) -> f64 {
        self.table.base_miss_chance
            - self
                .spell
                .physical_hit_chance(self.attacker, self.defender, &self.constants.ratings)
    }

    fn expertise(&self) -> f64 {
        self.spell
            .expertise_percentage(self.attacker, &self.constants.ratings)
    }

    /// Parry and block need the attacker in front of the defender
    fn from_front(&self) -> bool {
        self.attacker.pseudo.in_front_of_target
    }

    fn resolve(&mut self, bands: OutcomeBands, purpose: RollPurpose, result: &mut SpellResult) {
        let outcome = bands.classify(self.rolls.roll(purpose));
        self.apply(outcome, result);
    }

    /// Apply one primary outcome's effect on damage
    fn apply(&self, outcome: HitOutcome, result: &mut SpellResult) {
        if outcome.intersects(HitOutcome::MISS | HitOutcome::DODGE | HitOutcome::PARRY) {
            result.damage = 0.0;
            result.outcome |= outcome;
        } else if outcome.contains(HitOutcome::BLOCK) {
            let block_value = self.defender.stats[Stat::BlockValue];
            result.damage = (result.damage - block_value).max(0.0);
            result.outcome |= HitOutcome::BLOCK | HitOutcome::HIT;
        } else if outcome.contains(HitOutcome::GLANCE) {
            result.damage *= self.table.glance_multiplier;
            result.outcome |= HitOutcome::GLANCE;
        } else if outcome.contains(HitOutcome::CRUSH) {
            result.damage *= self.table.crush_multiplier;
            result.outcome |= HitOutcome::CRUSH;
        } else if outcome.contains(HitOutcome::CRIT) {
            result.damage *= self.spell.crit_multiplier;
            result.outcome |= HitOutcome::CRIT;
        } else {
            result.outcome |= HitOutcome::HIT;
        }
    }
}

/// Lands unconditionally
pub fn always_hit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    ctx.apply(HitOutcome::HIT, result);
}

/// Hit roll only
pub fn magic_hit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let outcome = if ctx.magic_hit_check() {
        HitOutcome::HIT
    } else {
        HitOutcome::MISS
    };
    ctx.apply(outcome, result);
}

/// Crit roll only; the spell cannot miss
pub fn magic_crit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let outcome = if ctx.magic_crit_check() {
        HitOutcome::CRIT
    } else {
        HitOutcome::HIT
    };
    ctx.apply(outcome, result);
}

/// Hit roll, then a crit roll for spells that landed
pub fn magic_hit_and_crit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let outcome = if !ctx.magic_hit_check() {
        HitOutcome::MISS
    } else if ctx.magic_crit_check() {
        HitOutcome::CRIT
    } else {
        HitOutcome::HIT
    };
    ctx.apply(outcome, result);
}

pub fn healing_crit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let outcome = if ctx.healing_crit_check() {
        HitOutcome::CRIT
    } else {
        HitOutcome::HIT
    };
    ctx.apply(outcome, result);
}

/// Periodic tick that cannot crit
pub fn tick(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    ctx.apply(HitOutcome::HIT, result);
}

/// Periodic tick with its own crit roll
pub fn magic_crit_tick(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    magic_crit(ctx, result);
}

/// Auto attack: one roll over miss, dodge, parry, block, glance, crit
pub fn melee_white(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let expertise = ctx.expertise();
    let front = ctx.from_front();
    let table = ctx.table;

    let mut bands = OutcomeBands::new()
        .push(HitOutcome::MISS, ctx.melee_miss_chance())
        .push(HitOutcome::DODGE, table.base_dodge_chance - expertise);
    if front {
        bands = bands
            .push(HitOutcome::PARRY, table.base_parry_chance - expertise)
            .push(HitOutcome::BLOCK, table.base_block_chance);
    }
    let bands = bands
        .push(HitOutcome::GLANCE, table.base_glance_chance)
        .push(HitOutcome::CRIT, ctx.physical_crit_chance())
        .finish();

    ctx.resolve(bands, RollPurpose::WhiteHitTable, result);
}

/// Yellow melee attack: one roll over miss, dodge, parry, block, crit
pub fn melee_special_hit_and_crit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let expertise = ctx.expertise();
    let front = ctx.from_front();
    let table = ctx.table;

    let mut bands = OutcomeBands::new()
        .push(HitOutcome::MISS, ctx.melee_miss_chance())
        .push(HitOutcome::DODGE, table.base_dodge_chance - expertise);
    if front {
        bands = bands
            .push(HitOutcome::PARRY, table.base_parry_chance - expertise)
            .push(HitOutcome::BLOCK, table.base_block_chance);
    }
    let bands = bands.push(HitOutcome::CRIT, ctx.physical_crit_chance()).finish();

    ctx.resolve(bands, RollPurpose::SpecialHitTable, result);
}

/// Melee attack that cannot be avoided except by missing
pub fn melee_special_no_block_dodge_parry(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let bands = OutcomeBands::new()
        .push(HitOutcome::MISS, ctx.melee_miss_chance())
        .push(HitOutcome::CRIT, ctx.physical_crit_chance())
        .finish();

    ctx.resolve(bands, RollPurpose::SpecialHitTable, result);
}

/// Ranged attack: one roll over miss, block, crit
pub fn ranged_hit_and_crit(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let front = ctx.from_front();
    let mut bands = OutcomeBands::new().push(HitOutcome::MISS, ctx.melee_miss_chance());
    if front {
        bands = bands.push(HitOutcome::BLOCK, ctx.table.base_block_chance);
    }
    let bands = bands.push(HitOutcome::CRIT, ctx.physical_crit_chance()).finish();

    ctx.resolve(bands, RollPurpose::RangedHitTable, result);
}

/// Enemy swing at a player: full table including crushing blows
pub fn enemy_melee(ctx: &mut OutcomeContext<'_>, result: &mut SpellResult) {
    let expertise = ctx.expertise();
    let table = ctx.table;

    let bands = OutcomeBands::new()
        .push(HitOutcome::MISS, ctx.melee_miss_chance())
        .push(HitOutcome::DODGE, table.base_dodge_chance - expertise)
        .push(HitOutcome::PARRY, table.base_parry_chance - expertise)
        .push(HitOutcome::BLOCK, table.base_block_chance)
        .push(HitOutcome::CRUSH, table.base_crush_chance)
        .push(HitOutcome::CRIT, ctx.physical_crit_chance())
        .finish();

    ctx.resolve(bands, RollPurpose::EnemyHitTable, result);
}

/// Config-selectable name for each applier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    AlwaysHit,
    MagicHit,
    MagicCrit,
    #[default]
    MagicHitAndCrit,
    HealingCrit,
    Tick,
    MagicCritTick,
    MeleeWhite,
    MeleeSpecialHitAndCrit,
    MeleeSpecialNoBlockDodgeParry,
    RangedHitAndCrit,
    EnemyMelee,
}

impl OutcomeKind {
    pub fn applier(self) -> OutcomeApplier {
        match self {
            OutcomeKind::AlwaysHit => always_hit,
            OutcomeKind::MagicHit => magic_hit,
            OutcomeKind::MagicCrit => magic_crit,
            OutcomeKind::MagicHitAndCrit => magic_hit_and_crit,
            OutcomeKind::HealingCrit => healing_crit,
            OutcomeKind::Tick => tick,
            OutcomeKind::MagicCritTick => magic_crit_tick,
            OutcomeKind::MeleeWhite => melee_white,
            OutcomeKind::MeleeSpecialHitAndCrit => melee_special_hit_and_crit,
            OutcomeKind::MeleeSpecialNoBlockDodgeParry => melee_special_no_block_dodge_parry,
            OutcomeKind::RangedHitAndCrit => ranged_hit_and_crit,
            OutcomeKind::EnemyMelee => enemy_melee,
        }
    }
}
