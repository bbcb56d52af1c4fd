//! Deterministic combat simulation rules.
//!
//! `battle-core` turns declarative skill-effect rows into typed per-actor
//! modifier bundles, derives battle-ready combat stats, resolves a battle turn
//! by turn, and records everything that happened in an append-only
//! [`log::BattleLog`] with a frozen binary encoding.
//!
//! Data flows leaves-first:
//!
//! ```text
//! RawEffect ─▶ effect::decode ─▶ skills::SkillCompiler ─▶ stats::calculate
//!                                        │                      │
//!                                        ▼                      ▼
//!                                  SkillEffects ──▶ roster::BattleActorSeed
//!                                                               │
//!                                                               ▼
//!                                        engine::BattleEngine ─▶ log::BattleLog ─▶ log::codec
//! ```
//!
//! The crate never touches the filesystem, a clock, or a global. Master data
//! is passed in through the oracle traits in [`env`], and randomness comes from
//! a seeded [`env::BattleRng`].
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod log;
pub mod roster;
pub mod skills;
pub mod stats;
pub mod types;

pub use config::{BattleConfig, RandomMode};
pub use effect::{
    ArrayKey, DecodeError, DecodeFailure, EffectFamily, EffectPayload, EffectType, ParamKey,
    RawEffect, ValidationReport, ValueKey, decode, validate_rows,
};
pub use engine::{
    ActiveBuff, ActiveStatus, BattleActor, BattleActorSeed, BattleEngine, BattleError,
    BattleState, SetupError, StepKind, StepOutcome,
};
pub use env::{
    BattleEnv, BattleRng, CharacterOracle, EnemyDefinition, EnemyOracle, ItemDefinition,
    JobDefinition, MasterData, OracleError, PcgRng, RaceDefinition, RngOracle, RollContext,
    SkillDefinition, SkillOracle, SpecialAttackDefinition, SpecialAttackOracle, SpellDefinition,
    SpellKind, SpellOracle, SpellTarget, StatusDefinition, StatusOracle, compute_seed,
};
pub use error::{BattleCoreError, ErrorSeverity};
pub use log::{
    ActionKind, BattleActionEntry, BattleEffect, BattleLog, BattleOutcome, DamageFlags,
    EffectKind, HpTimeline, LOG_VERSION, LogBuilder, LogCodecError, LogInvariantViolation,
    Participant, Participants, decode_log, encode_log, reconstruct_hp,
};
pub use roster::{PlayerCharacter, PreparedActor, prepare_enemy, prepare_player};
pub use skills::{
    CompiledSkills, ModifierProduct, ScalingContext, SkillCompiler, SkillEffects,
    StatModifierSet, compile_definitions,
};
pub use stats::{CombatSnapshot, StatInputs, base_attributes, calculate};
pub use types::{
    ActionChoice, ActorIndex, Attribute, BuffKind, CombatStat, DamageType, EnemyId,
    EquipmentCategory, HpScale, ItemId, JobId, RaceId, ReactionTrigger, Row, RowProfile, Side,
    SkillId, SpecialAttackId, SpellId, StatusId,
};
