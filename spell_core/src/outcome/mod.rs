//! Hit outcomes and the pluggable resolvers that choose them

mod appliers;
mod bands;

pub use appliers::{
    always_hit, enemy_melee, healing_crit, magic_crit, magic_crit_tick, magic_hit, magic_hit_and_crit,
    melee_special_hit_and_crit, melee_special_no_block_dodge_parry, melee_white, ranged_hit_and_crit, tick,
    OutcomeApplier, OutcomeContext, OutcomeKind,
};
pub use bands::{Band, OutcomeBands};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Classification of one resolution attempt.
    ///
    /// Exactly one primary bit (miss, dodge, parry, glance, crush, crit, hit)
    /// is set by a resolver. `BLOCK` and the partial-resist bits combine
    /// with a primary bit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct HitOutcome: u16 {
        const MISS        = 1 << 0;
        const HIT         = 1 << 1;
        const CRIT        = 1 << 2;
        const CRUSH       = 1 << 3;
        const GLANCE      = 1 << 4;
        const DODGE       = 1 << 5;
        const PARRY       = 1 << 6;
        const BLOCK       = 1 << 7;
        const PARTIAL_1_4 = 1 << 8;
        const PARTIAL_2_4 = 1 << 9;
        const PARTIAL_3_4 = 1 << 10;

        const PARTIAL = Self::PARTIAL_1_4.bits() | Self::PARTIAL_2_4.bits() | Self::PARTIAL_3_4.bits();
        const LANDED = Self::HIT.bits() | Self::CRIT.bits() | Self::CRUSH.bits() | Self::GLANCE.bits() | Self::BLOCK.bits();
    }
}

impl HitOutcome {
    /// Starting state of a result, before any resolver runs
    pub const EMPTY: HitOutcome = HitOutcome::empty();

    /// True if any bit of `other` is set
    pub fn matches(self, other: HitOutcome) -> bool {
        self.intersects(other)
    }

    /// Partial-resist bit for `quarters` quarters resisted (0 gives none)
    pub fn partial_resist(quarters: u8) -> HitOutcome {
        match quarters {
            1 => HitOutcome::PARTIAL_1_4,
            2 => HitOutcome::PARTIAL_2_4,
            3 => HitOutcome::PARTIAL_3_4,
            _ => HitOutcome::EMPTY,
        }
    }

    fn primary_name(self) -> &'static str {
        if self.contains(HitOutcome::MISS) {
            "Miss"
        } else if self.contains(HitOutcome::DODGE) {
            "Dodge"
        } else if self.contains(HitOutcome::PARRY) {
            "Parry"
        } else if self.contains(HitOutcome::GLANCE) {
            "Glance"
        } else if self.contains(HitOutcome::CRUSH) {
            "Crush"
        } else if self.contains(HitOutcome::CRIT) {
            "Crit"
        } else if self.contains(HitOutcome::HIT) {
            "Hit"
        } else if self.contains(HitOutcome::BLOCK) {
            "Block"
        } else {
            "Empty"
        }
    }
}

impl fmt::Display for HitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_name())?;
        if self.contains(HitOutcome::BLOCK) && self.intersects(HitOutcome::HIT | HitOutcome::CRIT) {
            f.write_str(" (Blocked)")?;
        }
        if self.contains(HitOutcome::PARTIAL_1_4) {
            f.write_str(" (25% Resist)")?;
        } else if self.contains(HitOutcome::PARTIAL_2_4) {
            f.write_str(" (50% Resist)")?;
        } else if self.contains(HitOutcome::PARTIAL_3_4) {
            f.write_str(" (75% Resist)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landed_set() {
        assert!(HitOutcome::HIT.matches(HitOutcome::LANDED));
        assert!(HitOutcome::CRIT.matches(HitOutcome::LANDED));
        assert!((HitOutcome::BLOCK | HitOutcome::HIT).matches(HitOutcome::LANDED));
        assert!(!HitOutcome::MISS.matches(HitOutcome::LANDED));
        assert!(!HitOutcome::DODGE.matches(HitOutcome::LANDED));
        assert!(!HitOutcome::PARRY.matches(HitOutcome::LANDED));
        assert!(!HitOutcome::EMPTY.matches(HitOutcome::LANDED));
    }

    #[test]
    fn test_display() {
        assert_eq!(HitOutcome::CRIT.to_string(), "Crit");
        assert_eq!((HitOutcome::HIT | HitOutcome::BLOCK).to_string(), "Hit (Blocked)");
        assert_eq!(
            (HitOutcome::HIT | HitOutcome::PARTIAL_2_4).to_string(),
            "Hit (50% Resist)"
        );
        assert_eq!(HitOutcome::EMPTY.to_string(), "Empty");
    }

    #[test]
    fn test_partial_resist_bits() {
        assert_eq!(HitOutcome::partial_resist(0), HitOutcome::EMPTY);
        assert_eq!(HitOutcome::partial_resist(3), HitOutcome::PARTIAL_3_4);
        assert!(HitOutcome::partial_resist(1).matches(HitOutcome::PARTIAL));
    }
}
