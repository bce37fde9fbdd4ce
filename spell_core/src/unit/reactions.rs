//! Ordered reaction hooks fired by the deal step

use crate::sim::Simulation;
use crate::spell::SpellResult;
use crate::types::SpellId;
use std::sync::Arc;
use strum::{EnumCount, EnumIter};

/// Callback run after a result is recorded. Handlers get the whole
/// simulation so a proc can cast other spells, including the one that
/// triggered it.
pub type ReactionHandler = Arc<dyn Fn(&mut Simulation, SpellId, &SpellResult) + Send + Sync>;

/// Which event a handler listens for. Each deal fires the attacker's
/// `*Dealt` list, then the target's `*Taken` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, strum::Display)]
pub enum ReactionKind {
    SpellHitDealt,
    SpellHitTaken,
    PeriodicDamageDealt,
    PeriodicDamageTaken,
    HealDealt,
    HealTaken,
    PeriodicHealDealt,
    PeriodicHealTaken,
}

impl ReactionKind {
    /// (attacker side, target side) for a deal of this shape
    pub fn pair(healing: bool, periodic: bool) -> (ReactionKind, ReactionKind) {
        match (healing, periodic) {
            (false, false) => (ReactionKind::SpellHitDealt, ReactionKind::SpellHitTaken),
            (false, true) => (ReactionKind::PeriodicDamageDealt, ReactionKind::PeriodicDamageTaken),
            (true, false) => (ReactionKind::HealDealt, ReactionKind::HealTaken),
            (true, true) => (ReactionKind::PeriodicHealDealt, ReactionKind::PeriodicHealTaken),
        }
    }
}

/// Handler lists, one per [`ReactionKind`], each kept in registration order
#[derive(Default, Clone)]
pub struct Reactions {
    lists: [Vec<ReactionHandler>; ReactionKind::COUNT],
}

impl Reactions {
    pub fn on(&mut self, kind: ReactionKind, handler: ReactionHandler) {
        self.lists[kind as usize].push(handler);
    }

    pub fn handlers(&self, kind: ReactionKind) -> &[ReactionHandler] {
        &self.lists[kind as usize]
    }

    pub fn len(&self, kind: ReactionKind) -> usize {
        self.lists[kind as usize].len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for Reactions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<usize> = self.lists.iter().map(Vec::len).collect();
        f.debug_struct("Reactions").field("counts", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_dealt_then_taken() {
        assert_eq!(
            ReactionKind::pair(false, true),
            (ReactionKind::PeriodicDamageDealt, ReactionKind::PeriodicDamageTaken)
        );
        assert_eq!(
            ReactionKind::pair(true, false),
            (ReactionKind::HealDealt, ReactionKind::HealTaken)
        );
    }

    #[test]
    fn test_handlers_kept_per_kind() {
        let mut reactions = Reactions::default();
        assert!(reactions.is_empty());

        let noop: ReactionHandler = Arc::new(|_: &mut Simulation, _: SpellId, _: &SpellResult| {});
        reactions.on(ReactionKind::HealTaken, noop.clone());
        reactions.on(ReactionKind::HealTaken, noop);

        assert_eq!(reactions.len(ReactionKind::HealTaken), 2);
        assert_eq!(reactions.handlers(ReactionKind::SpellHitDealt).len(), 0);
        assert!(!reactions.is_empty());
    }
}
