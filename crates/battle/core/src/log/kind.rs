//! Declaration and effect vocabularies, and which effects each declaration admits.

use strum::{Display, EnumCount, EnumIter, FromRepr};

/// What an entry declares. Stored as one byte; the discriminants are part of
/// the persisted format and never change.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, FromRepr, Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
#[repr(u8)]
pub enum ActionKind {
    BattleStart = 0,
    TurnStart = 1,
    Victory = 2,
    Defeat = 3,
    Retreat = 4,
    EnemyAppear = 5,
    PhysicalAttack = 6,
    SpellCast = 7,
    Breath = 8,
    SpecialAttack = 9,
    Counter = 10,
    FollowUp = 11,
    Retaliation = 12,
    Rescue = 13,
    Resurrection = 14,
    Necromancy = 15,
    Sacrifice = 16,
    StatusTick = 17,
    TimedBuffTrigger = 18,
    TurnEndHeal = 19,
    SelfHpDelta = 20,
    SpellChargeRecovery = 21,
    Runaway = 22,
    DegradationRepair = 23,
    EnemyStatDebuff = 24,
    BuffTick = 25,
    Incapacitated = 26,
    /// A kill with no open causal entry.
    PhysicalKill = 27,
}

/// One observable result. Stored as one byte; discriminants are frozen.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, FromRepr, Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
#[repr(u8)]
pub enum EffectKind {
    Marker = 0,
    PhysicalDamage = 1,
    MagicalDamage = 2,
    BreathDamage = 3,
    Evade = 4,
    Parry = 5,
    Heal = 6,
    Absorb = 7,
    Defeated = 8,
    StatusInflicted = 9,
    StatusResisted = 10,
    StatusTickDamage = 11,
    StatusRecovered = 12,
    BuffApplied = 13,
    BuffExpired = 14,
    /// `value` is the HP the actor comes back with.
    Resurrected = 15,
    /// `value` is the HP the actor comes back with.
    Rescued = 16,
    Sacrificed = 17,
    ChargeRecovered = 18,
    Fled = 19,
    Repaired = 20,
    StatDebuffed = 21,
    SelfDamage = 22,
    Cover = 23,
    ActionSkipped = 24,
}

impl EffectKind {
    /// Kinds whose `value` is HP removed from `target`.
    pub const fn is_damage(self) -> bool {
        matches!(
            self,
            Self::PhysicalDamage
                | Self::MagicalDamage
                | Self::BreathDamage
                | Self::StatusTickDamage
                | Self::SelfDamage
        )
    }

    /// Kinds whose `value` is HP restored to `target`.
    pub const fn is_heal(self) -> bool {
        matches!(self, Self::Heal | Self::Absorb)
    }

    /// Kinds whose `value` is the target's new HP after a revive.
    pub const fn is_revive(self) -> bool {
        matches!(self, Self::Resurrected | Self::Rescued)
    }
}

const STRIKE: &[EffectKind] = &[
    EffectKind::PhysicalDamage,
    EffectKind::Evade,
    EffectKind::Parry,
    EffectKind::Absorb,
    EffectKind::Defeated,
    EffectKind::StatusInflicted,
    EffectKind::StatusResisted,
    EffectKind::Cover,
];

impl ActionKind {
    /// Kinds that carry at most one marker effect.
    pub const fn is_declaration_only(self) -> bool {
        matches!(
            self,
            Self::BattleStart
                | Self::TurnStart
                | Self::Victory
                | Self::Defeat
                | Self::Retreat
                | Self::EnemyAppear
        )
    }

    /// Declaration-only kinds that nevertheless name an actor.
    pub const fn requires_actor(self) -> bool {
        !self.is_declaration_only() || matches!(self, Self::EnemyAppear)
    }

    /// Closed set of effect kinds an entry of this kind may contain.
    pub fn legal_effects(self) -> &'static [EffectKind] {
        use EffectKind as E;
        match self {
            Self::BattleStart
            | Self::TurnStart
            | Self::Victory
            | Self::Defeat
            | Self::Retreat
            | Self::EnemyAppear => &[E::Marker],
            Self::PhysicalAttack | Self::Counter | Self::FollowUp | Self::Retaliation => STRIKE,
            Self::SpecialAttack => &[
                E::PhysicalDamage,
                E::MagicalDamage,
                E::BreathDamage,
                E::Evade,
                E::Parry,
                E::Absorb,
                E::Defeated,
                E::StatusInflicted,
                E::StatusResisted,
                E::Cover,
            ],
            Self::SpellCast => &[
                E::MagicalDamage,
                E::Heal,
                E::Absorb,
                E::Defeated,
                E::StatusInflicted,
                E::StatusResisted,
            ],
            Self::Breath => &[
                E::BreathDamage,
                E::Evade,
                E::Absorb,
                E::Defeated,
                E::StatusInflicted,
                E::StatusResisted,
            ],
            Self::Rescue => &[E::Rescued],
            Self::Resurrection | Self::Necromancy => &[E::Resurrected],
            Self::Sacrifice => &[E::Sacrificed, E::Resurrected],
            Self::StatusTick => &[E::StatusTickDamage, E::StatusRecovered, E::Defeated],
            Self::TimedBuffTrigger => &[E::BuffApplied],
            Self::BuffTick => &[E::BuffExpired],
            Self::TurnEndHeal => &[E::Heal],
            Self::SelfHpDelta => &[E::Heal, E::SelfDamage, E::Defeated],
            Self::SpellChargeRecovery => &[E::ChargeRecovered],
            Self::Runaway => &[E::Fled],
            Self::DegradationRepair => &[E::Repaired],
            Self::EnemyStatDebuff => &[E::StatDebuffed],
            Self::Incapacitated => &[E::ActionSkipped],
            Self::PhysicalKill => &[E::Defeated],
        }
    }

    pub fn permits(self, effect: EffectKind) -> bool {
        self.legal_effects().contains(&effect)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_effect_kind_is_legal_somewhere() {
        for effect in EffectKind::iter() {
            assert!(
                ActionKind::iter().any(|action| action.permits(effect)),
                "{effect} can never be logged"
            );
        }
    }

    #[test]
    fn declarations_only_admit_markers() {
        for action in ActionKind::iter().filter(|a| a.is_declaration_only()) {
            assert_eq!(action.legal_effects(), &[EffectKind::Marker]);
        }
        assert!(!ActionKind::PhysicalAttack.permits(EffectKind::Marker));
    }

    #[test]
    fn spells_cannot_be_evaded() {
        assert!(!ActionKind::SpellCast.permits(EffectKind::Evade));
        assert!(ActionKind::PhysicalAttack.permits(EffectKind::Evade));
    }
}
