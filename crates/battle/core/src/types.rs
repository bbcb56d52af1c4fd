//! Identifiers and the small closed vocabularies shared by every stage.
//!
//! Every enumeration that an effect row references through an integer
//! parameter is `#[repr(u8)]` and derives [`strum::FromRepr`], so the decoder
//! can reject out-of-domain integers instead of guessing.

use core::ops::{Index, IndexMut};

use strum::{Display, EnumCount, EnumIter, FromRepr, IntoEnumIterator, IntoStaticStr};

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub $inner);

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Master-data skill identifier.
    SkillId(u16),
    "skill"
);
define_id!(
    /// Master-data spell identifier.
    SpellId(u8),
    "spell"
);
define_id!(
    /// Master-data status-effect identifier.
    StatusId(u8),
    "status"
);
define_id!(
    /// Master-data special attack identifier (enemy techniques).
    SpecialAttackId(u8),
    "special"
);
define_id!(RaceId(u16), "race");
define_id!(JobId(u16), "job");
define_id!(ItemId(u16), "item");
define_id!(
    /// Enemy master index.
    EnemyId(u16),
    "enemy"
);

/// Battle-scoped combatant identifier.
///
/// Players use their `characterId` directly; enemies use
/// `(arrayIndex + 1) * 1000 + masterIndex`. Stable for the whole battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorIndex(pub u16);

impl ActorIndex {
    /// Stride between enemy array slots.
    pub const ENEMY_STRIDE: u16 = 1000;

    pub const fn player(character_id: u16) -> Self {
        Self(character_id)
    }

    /// Returns `None` when the index would overflow `u16` or the master index
    /// would bleed into the next array slot.
    pub fn enemy(array_index: u16, master: EnemyId) -> Option<Self> {
        if master.0 >= Self::ENEMY_STRIDE {
            return None;
        }
        array_index
            .checked_add(1)?
            .checked_mul(Self::ENEMY_STRIDE)?
            .checked_add(master.0)
            .map(Self)
    }
}

impl core::fmt::Display for ActorIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

// ============================================================================
// Closed vocabularies
// ============================================================================

/// Damage channel of an attack. Dealt/taken modifiers and barriers are keyed by it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, FromRepr, Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DamageType {
    Physical = 0,
    Magical = 1,
    Breath = 2,
}

/// Derived combat stat produced by the stat calculator.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumCount,
    FromRepr,
    Display,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CombatStat {
    MaxHp = 0,
    PhysicalAttack = 1,
    MagicalAttack = 2,
    PhysicalDefense = 3,
    MagicalDefense = 4,
    HitScore = 5,
    EvasionScore = 6,
    CriticalChance = 7,
    AttackCount = 8,
    MagicalHealing = 9,
    TrapRemoval = 10,
    AdditionalDamage = 11,
    BreathDamage = 12,
}

/// Primary attribute of a character or enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, FromRepr, Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Attribute {
    Strength = 0,
    Wisdom = 1,
    Spirit = 2,
    Vitality = 3,
    Agility = 4,
    Luck = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Formation row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Row {
    #[default]
    Front = 0,
    Back = 1,
}

/// How physical damage of an actor reacts to the rows involved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RowProfile {
    /// Full damage from the front row, halved from the back row.
    #[default]
    Melee = 0,
    /// Flat 75% from either row.
    Balanced = 1,
    /// Full damage from either row.
    Ranged = 2,
}

impl RowProfile {
    pub fn attack_multiplier(self, attacker_row: Row) -> f64 {
        match (self, attacker_row) {
            (Self::Melee, Row::Front) | (Self::Ranged, _) => 1.0,
            (Self::Melee, Row::Back) => 0.5,
            (Self::Balanced, _) => 0.75,
        }
    }
}

/// HP restored by a resurrection capability, relative to max HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum HpScale {
    One = 0,
    MaxHp5Percent = 1,
    MaxHp25Percent = 2,
    MaxHp50Percent = 3,
    Full = 4,
}

impl HpScale {
    /// Resolves the scale against a max HP. Never returns less than 1.
    pub fn resolve(self, max_hp: u32) -> u32 {
        let hp = match self {
            Self::One => 1,
            Self::MaxHp5Percent => max_hp / 20,
            Self::MaxHp25Percent => max_hp / 4,
            Self::MaxHp50Percent => max_hp / 2,
            Self::Full => max_hp,
        };
        hp.max(1)
    }
}

/// Equipment category used by item stat multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EquipmentCategory {
    ThinSword = 0,
    Sword = 1,
    Katana = 2,
    Bow = 3,
    Armor = 4,
    HeavyArmor = 5,
    Shield = 6,
    Gauntlet = 7,
    Wand = 8,
    Rod = 9,
    Grimoire = 10,
    Robe = 11,
    Gem = 12,
    Other = 13,
}

impl EquipmentCategory {
    /// Weapons that leave the wielder eligible for martial-arts bonuses.
    pub const fn is_martial(self) -> bool {
        matches!(self, Self::Gauntlet)
    }

    pub const fn is_weapon(self) -> bool {
        matches!(
            self,
            Self::ThinSword
                | Self::Sword
                | Self::Katana
                | Self::Bow
                | Self::Gauntlet
                | Self::Wand
                | Self::Rod
        )
    }
}

/// Weighted action families an actor chooses between each turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ActionChoice {
    Attack = 0,
    Spell = 1,
    Breath = 2,
}

/// Condition that fires a reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ReactionTrigger {
    /// The reactor took damage (optionally of one damage type): counter-attack.
    Damaged = 0,
    /// The reactor evaded an attack: counter-attack.
    Evaded = 1,
    /// An ally landed a physical attack on a surviving enemy: follow-up.
    AllyAttacked = 2,
    /// An ally was defeated: retaliation against the attacker.
    AllyDefeated = 3,
}

/// Stat family a timed buff modifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BuffKind {
    DamageDealt = 0,
    DamageTaken = 1,
    HitScore = 2,
    EvasionScore = 3,
}

// ============================================================================
// Keyed tables
// ============================================================================

macro_rules! keyed_table {
    ($(#[$meta:meta])* $name:ident, $key:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name<T>([T; <$key as EnumCount>::COUNT]);

        impl<T: Copy> $name<T> {
            /// Table with every slot set to `value`.
            pub const fn splat(value: T) -> Self {
                Self([value; <$key as EnumCount>::COUNT])
            }

            pub fn get(&self, key: $key) -> T {
                self.0[key as usize]
            }
        }

        impl<T> $name<T> {
            pub fn iter(&self) -> impl Iterator<Item = ($key, &T)> + '_ {
                <$key>::iter().zip(self.0.iter())
            }
        }

        impl<T> Index<$key> for $name<T> {
            type Output = T;

            fn index(&self, key: $key) -> &T {
                &self.0[key as usize]
            }
        }

        impl<T> IndexMut<$key> for $name<T> {
            fn index_mut(&mut self, key: $key) -> &mut T {
                &mut self.0[key as usize]
            }
        }
    };
}

keyed_table!(
    /// One slot per [`DamageType`].
    PerDamageType,
    DamageType
);
keyed_table!(
    /// One slot per [`CombatStat`].
    PerStat,
    CombatStat
);
keyed_table!(
    /// One slot per [`Attribute`].
    PerAttribute,
    Attribute
);
