//! Effect payload decoding.
//!
//! A raw row is a type tag plus three loosely-typed maps. [`decode`] checks the
//! row against the required-field table of its type and produces an
//! [`EffectPayload`] whose shape is fixed by the type's family.

mod decode;
mod error;
mod keys;
mod kind;
mod payload;
mod raw;
mod validate;

pub use decode::decode;
pub use error::{DecodeError, DecodeFailure};
pub use keys::{ArrayKey, ParamKey, ValueKey};
pub use kind::{EffectFamily, EffectSchema, EffectType};
pub use payload::{
    CombatEffect, DamageEffect, EffectPayload, EquipmentSlotEffect, ExplorationEffect,
    MiscEffect, Modifier, ReactionRule, ResurrectionEffect, RewardEffect, SpellEffect,
    SpellbookEffect, StatEffect, StatusModifierEffect, TimedBuffTrigger,
};
pub use raw::RawEffect;
pub use validate::{ValidationReport, validate_rows};
