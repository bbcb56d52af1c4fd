//! Skill effect compilation.
//!
//! Every payload of every active skill is folded into one [`CompiledSkills`]:
//! the in-battle [`SkillEffects`] bundle plus the side channels consumed
//! outside battle (stat calculator, equipment slots, spellbook, rewards,
//! exploration).
//!
//! Accumulation rules by shape:
//!
//! | shape | rule |
//! |---|---|
//! | percent / multiplier on one target | [`ModifierProduct`]: `∏(1 + p/100) × ∏(m)` |
//! | flat stat bonus, chance points | sum |
//! | fixed-to-one | flag, wins over everything at the end of the stat pipeline |
//! | reactions, extra actions, barriers, inflictions, revives | one list entry per effect |
//! | caps and floors | most extreme value wins |

mod bundle;
mod channels;
mod compiler;
mod product;

pub use bundle::{
    BarrierGrant, ChanceRevive, ChargeRecoveryRule, CombatModifiers, DamageModifiers,
    ExtraActionGrant, HpThresholdRule, IntervalRevive, MiscModifiers, ResurrectionModifiers,
    RunawayRule, SkillEffects, SpecialAttackGrant, SpellModifiers, StatDebuff, StatusInfliction,
    StatusModifiers,
};
pub use channels::{
    EquipmentSlotModifiers, ExplorationScalars, RewardScalars, SpellbookAccess, StatConversion,
    StatModifierSet,
};
pub use compiler::{CompiledSkills, ScalingContext, SkillCompiler, compile_definitions};
pub use product::ModifierProduct;
