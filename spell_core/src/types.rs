//! Core identifiers and enumerations shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identity of an ability. Two spells with the same spell id but different
/// tags are distinct actions (e.g. the main-hand and off-hand halves of a strike).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId {
    pub spell_id: u32,
    #[serde(default)]
    pub tag: i32,
}

impl ActionId {
    pub const fn spell(spell_id: u32) -> Self {
        ActionId { spell_id, tag: 0 }
    }

    pub const fn with_tag(self, tag: i32) -> Self {
        ActionId { tag, ..self }
    }

    pub fn same_action(&self, other: ActionId) -> bool {
        *self == other
    }

    pub fn same_action_ignore_tag(&self, other: ActionId) -> bool {
        self.spell_id == other.spell_id
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag == 0 {
            write!(f, "{{SpellID: {}}}", self.spell_id)
        } else {
            write!(f, "{{SpellID: {}, Tag: {}}}", self.spell_id, self.tag)
        }
    }
}

/// Position of a unit in the simulation roster. Also the index into
/// per-target arrays (metrics, attack tables).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitIndex(pub usize);

impl fmt::Display for UnitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit #{}", self.0)
    }
}

/// Handle into the simulation's spell arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpellId(pub usize);

/// Which side of the encounter a unit is on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    #[default]
    Player,
    Pet,
    Enemy,
}

/// Damage school. Every spell belongs to exactly one.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumCount,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum School {
    #[default]
    Physical,
    Arcane,
    Fire,
    Frost,
    Holy,
    Nature,
    Shadow,
}

impl School {
    pub fn all() -> impl Iterator<Item = School> {
        School::iter()
    }

    pub fn is_physical(self) -> bool {
        self == School::Physical
    }
}

/// A value per damage school, indexed by [`School`].
///
/// Replaces a chain of per-school fields with one array so the school
/// dispatch is a single indexed load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchoolTable<T>([T; School::COUNT]);

impl<T: Copy> SchoolTable<T> {
    pub fn splat(value: T) -> Self {
        SchoolTable([value; School::COUNT])
    }

    pub fn iter(&self) -> impl Iterator<Item = (School, T)> + '_ {
        School::iter().map(move |s| (s, self.0[s as usize]))
    }
}

impl SchoolTable<f64> {
    /// All-ones table, the identity for multiplier tables
    pub fn identity() -> Self {
        Self::splat(1.0)
    }
}

impl Default for SchoolTable<f64> {
    fn default() -> Self {
        Self::splat(0.0)
    }
}

impl<T> Index<School> for SchoolTable<T> {
    type Output = T;

    fn index(&self, school: School) -> &T {
        &self.0[school as usize]
    }
}

impl<T> IndexMut<School> for SchoolTable<T> {
    fn index_mut(&mut self, school: School) -> &mut T {
        &mut self.0[school as usize]
    }
}

/// Resource a spell consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Mana,
    Rage,
    Energy,
    RunicPower,
    BloodRune,
    FrostRune,
    UnholyRune,
    DeathRune,
}
