use std::collections::{BTreeMap, VecDeque};

use crate::config::{BattleConfig, RandomMode};
use crate::env::{
    BattleEnv, BattleRng, OracleError, RollContext, SpecialAttackDefinition, SpellDefinition,
    StatusDefinition,
};
use crate::log::LogBuilder;
use crate::types::{ActorIndex, Side, SpecialAttackId, SpellId, StatusId};

use super::actor::{BattleActor, BattleActorSeed};
use super::reaction::Pending;

/// Master-data tables one battle reads, resolved once at setup.
#[derive(Clone, Debug, Default)]
pub(crate) struct BattleTables {
    pub spells: BTreeMap<SpellId, SpellDefinition>,
    pub statuses: BTreeMap<StatusId, StatusDefinition>,
    pub specials: BTreeMap<SpecialAttackId, SpecialAttackDefinition>,
}

impl BattleTables {
    /// Resolves every spell, status and special attack the seeds can reach.
    pub fn resolve(env: &BattleEnv<'_>, seeds: &[BattleActorSeed]) -> Result<Self, OracleError> {
        let mut tables = Self::default();
        let mut statuses = Vec::new();

        for seed in seeds {
            for id in &seed.spells {
                if !tables.spells.contains_key(id) {
                    let spell = env.spell(*id)?;
                    statuses.extend(spell.status);
                    tables.spells.insert(*id, spell);
                }
            }
            for grant in &seed.effects.combat.special_attacks {
                if !tables.specials.contains_key(&grant.id) {
                    let special = env.special_attack(grant.id)?;
                    statuses.extend(special.status);
                    tables.specials.insert(grant.id, special);
                }
            }
            statuses.extend(seed.effects.status.inflictions.iter().map(|i| i.status));
        }

        for id in statuses {
            if !tables.statuses.contains_key(&id) {
                tables.statuses.insert(id, env.status(id)?);
            }
        }
        Ok(tables)
    }
}

/// The single owner of all per-battle mutable state.
#[derive(Clone, Debug)]
pub(crate) struct BattleContext {
    pub config: BattleConfig,
    pub tables: BattleTables,
    /// Players in party order, then enemies in roster order.
    pub actors: Vec<BattleActor>,
    pub rng: BattleRng,
    pub log: LogBuilder,
    pub turn: u16,
    pub pending: VecDeque<Pending>,
}

impl BattleContext {
    pub fn position(&self, index: ActorIndex) -> Option<usize> {
        self.actors.iter().position(|actor| actor.index == index)
    }

    pub fn actor(&self, index: ActorIndex) -> Option<&BattleActor> {
        self.actors.iter().find(|actor| actor.index == index)
    }

    /// Positions of living actors on `side`, in roster order.
    pub fn living(&self, side: Side) -> Vec<usize> {
        self.actors
            .iter()
            .enumerate()
            .filter(|(_, actor)| actor.side == side && actor.is_alive())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Positions of fallen (revivable) actors on `side`, in roster order.
    pub fn fallen(&self, side: Side) -> Vec<usize> {
        self.actors
            .iter()
            .enumerate()
            .filter(|(_, actor)| actor.side == side && actor.is_fallen())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn any_alive(&self, side: Side) -> bool {
        self.actors
            .iter()
            .any(|actor| actor.side == side && actor.is_alive())
    }

    /// Damage variance factor: `[0.9, 1.1)` seeded, exactly `1.0` at median.
    pub fn variance(&mut self, actor: ActorIndex) -> f64 {
        match self.config.random_mode {
            RandomMode::FixedMedian => 1.0,
            RandomMode::Seeded => 0.9 + 0.2 * self.rng.unit(actor, RollContext::Variance),
        }
    }

    pub fn roll(&mut self, actor: ActorIndex, context: RollContext, percent: f64) -> bool {
        self.rng.chance(actor, context, percent)
    }
}
