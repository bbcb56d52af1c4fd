//! Battle turn engine.
//!
//! [`BattleEngine`] owns one [`context::BattleContext`] and advances it one
//! step at a time: the battle start, each turn start, each actor's action,
//! and each turn end. Every step returns the entries it appended, so a
//! consumer can pace playback without ever seeing a half-written entry.
//!
//! ```text
//! notStarted ─▶ running ─┬─▶ completed   (no enemy standing)
//!                        ├─▶ defeated    (every player fallen)
//!                        └─▶ retreated   (retreat trigger or turn limit)
//! ```
//!
//! The engine is a pure function of its seeds, configuration and battle
//! seed: replaying the same inputs reproduces the same log byte for byte.

mod actor;
mod context;
mod damage;
mod error;
mod order;
mod reaction;
mod resolve;
mod select;
mod state;
mod turn_end;

pub use actor::{ActiveBuff, ActiveStatus, BattleActor, BattleActorSeed};
pub use damage::{
    DamageFactors, barrier, base_damage, critical_chance, final_damage, hit_chance, landed_damage,
    percent_of_max_hp,
};
pub use error::{BattleError, SetupError};
pub use state::{BattleState, StepKind, StepOutcome};

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::config::BattleConfig;
use crate::env::{BattleEnv, BattleRng};
use crate::log::{
    ActionKind, BattleActionEntry, BattleEffect, BattleLog, BattleOutcome, EffectKind,
    LogBuilder, LogInvariantViolation, Participant, Participants, disambiguation_labels,
};
use crate::types::{ActorIndex, Side, SpellId};

use context::{BattleContext, BattleTables};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    TurnStart,
    Acting,
}

/// Step-driven simulation of one battle.
#[derive(Clone, Debug)]
pub struct BattleEngine {
    ctx: BattleContext,
    state: BattleState,
    phase: Phase,
    queue: VecDeque<ActorIndex>,
    participants: Participants,
}

impl BattleEngine {
    /// Sets up a battle between `players` (party order) and `enemies`
    /// (roster order).
    ///
    /// Every spell, status and special attack the actors can reach is
    /// resolved here; a missing definition fails setup instead of surfacing
    /// mid-battle.
    pub fn new(
        env: &BattleEnv<'_>,
        config: BattleConfig,
        seed: u64,
        players: Vec<BattleActorSeed>,
        enemies: Vec<BattleActorSeed>,
    ) -> Result<Self, BattleError> {
        validate_side(&players, Side::Player)?;
        validate_side(&enemies, Side::Enemy)?;
        let mut seen = BTreeSet::new();
        for seed in players.iter().chain(&enemies) {
            if !seen.insert(seed.index) {
                return Err(SetupError::DuplicateActor { actor: seed.index }.into());
            }
        }

        let seeds: Vec<BattleActorSeed> = players.into_iter().chain(enemies).collect();
        let tables = BattleTables::resolve(env, &seeds)?;

        let actors: Vec<BattleActor> = seeds
            .into_iter()
            .map(|seed| {
                let charges = starting_charges(&seed, &tables);
                BattleActor::from_seed(seed, charges)
            })
            .collect();
        let initial_hp = actors.iter().map(|actor| (actor.index, actor.hp)).collect();
        let participants = participants(&actors);

        Ok(Self {
            ctx: BattleContext {
                config,
                tables,
                actors,
                rng: BattleRng::new(seed),
                log: LogBuilder::new(initial_hp),
                turn: 0,
                pending: VecDeque::new(),
            },
            state: BattleState::NotStarted,
            phase: Phase::TurnStart,
            queue: VecDeque::new(),
            participants,
        })
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    /// Current turn; `0` before the first turn starts.
    pub fn turn(&self) -> u16 {
        self.ctx.turn
    }

    pub fn actors(&self) -> &[BattleActor] {
        &self.ctx.actors
    }

    pub fn actor(&self, index: ActorIndex) -> Option<&BattleActor> {
        self.ctx.actor(index)
    }

    /// Entries appended so far.
    pub fn entries(&self) -> &[BattleActionEntry] {
        self.ctx.log.entries()
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    /// Resolves the next step.
    pub fn step(&mut self) -> Result<StepOutcome, BattleError> {
        if self.state.is_finished() {
            return Err(BattleError::AlreadyFinished { state: self.state });
        }
        let mark = self.ctx.log.len();

        let kind = match (self.state, self.phase) {
            (BattleState::NotStarted, _) => {
                self.open_battle();
                self.state = BattleState::Running;
                StepKind::BattleStart
            }
            (_, Phase::TurnStart) => {
                self.start_turn();
                StepKind::TurnStart
            }
            (_, Phase::Acting) => match self.next_actor() {
                Some(pos) => {
                    let index = self.ctx.actors[pos].index;
                    resolve::take_turn(&mut self.ctx, pos);
                    StepKind::Action(index)
                }
                None => {
                    let retreated = turn_end::run(&mut self.ctx);
                    self.phase = Phase::TurnStart;
                    if let Some(outcome) = self.turn_end_outcome(retreated) {
                        self.conclude(outcome);
                    }
                    StepKind::TurnEnd
                }
            },
        };

        if !self.state.is_finished() {
            if let Some(outcome) = self.wipe_outcome() {
                if self.phase == Phase::Acting && self.revival_pending(outcome) {
                    // the rest of the turn is skipped; turn end decides
                    self.queue.clear();
                } else {
                    self.conclude(outcome);
                }
            }
        }

        Ok(StepOutcome {
            kind,
            turn: self.ctx.turn,
            entries: self.ctx.log.entries_since(mark).to_vec(),
            state: self.state,
        })
    }

    /// Seals the log of a finished battle.
    ///
    /// Returns the log with every invariant violation the builder recorded;
    /// the list is empty for a well-behaved engine.
    pub fn finish(self) -> Result<(BattleLog, Vec<LogInvariantViolation>), BattleError> {
        let Some(outcome) = self.state.outcome() else {
            return Err(BattleError::NotFinished { state: self.state });
        };
        Ok(self
            .ctx
            .log
            .seal(outcome, self.ctx.turn, self.participants))
    }

    /// Steps until the battle ends, then seals the log.
    pub fn run(mut self) -> Result<(BattleLog, Vec<LogInvariantViolation>), BattleError> {
        while !self.state.is_finished() {
            self.step()?;
        }
        self.finish()
    }

    fn open_battle(&mut self) {
        let ctx = &mut self.ctx;
        ctx.log
            .announce_with_marker(BattleActionEntry::declare(0, None, ActionKind::BattleStart));
        for pos in ctx.living(Side::Enemy) {
            let index = ctx.actors[pos].index;
            ctx.log.announce_with_marker(BattleActionEntry::declare(
                0,
                Some(index),
                ActionKind::EnemyAppear,
            ));
        }

        for pos in 0..ctx.actors.len() {
            let debuffs = ctx.actors[pos].effects.combat.enemy_debuffs.clone();
            if debuffs.is_empty() {
                continue;
            }
            let index = ctx.actors[pos].index;
            let opponents = ctx.living(ctx.actors[pos].side.opponent());
            ctx.log.declare(BattleActionEntry::declare(
                0,
                Some(index),
                ActionKind::EnemyStatDebuff,
            ));
            for opponent in opponents {
                let target = ctx.actors[opponent].index;
                for debuff in &debuffs {
                    let current = &mut ctx.actors[opponent].debuffs[debuff.stat];
                    *current = (*current + debuff.percent).clamp(0.0, 100.0);
                    ctx.log.push(
                        BattleEffect::on(EffectKind::StatDebuffed, target)
                            .with_value(hundredths(debuff.percent))
                            .with_extra(debuff.stat as u32),
                    );
                }
            }
            ctx.log.close();
        }
    }

    fn start_turn(&mut self) {
        let ctx = &mut self.ctx;
        ctx.turn = ctx.turn.saturating_add(1);
        let turn = ctx.turn;
        ctx.log.announce(turn, None, ActionKind::TurnStart);

        for pos in 0..ctx.actors.len() {
            if !ctx.actors[pos].is_alive() {
                continue;
            }
            let index = ctx.actors[pos].index;
            let fired: Vec<_> = ctx.actors[pos]
                .effects
                .status
                .timed_buffs
                .iter()
                .filter(|trigger| trigger.fires_on(turn))
                .copied()
                .collect();
            if fired.is_empty() {
                continue;
            }
            ctx.log.declare(BattleActionEntry::declare(
                turn,
                Some(index),
                ActionKind::TimedBuffTrigger,
            ));
            for trigger in fired {
                ctx.actors[pos].buffs.push(ActiveBuff {
                    kind: trigger.kind,
                    percent: trigger.percent,
                    remaining: trigger.duration.max(1),
                });
                ctx.log.push(
                    BattleEffect::on(EffectKind::BuffApplied, index)
                        .with_value(hundredths(trigger.percent))
                        .with_extra(trigger.kind as u32),
                );
            }
            ctx.log.close();
        }

        self.queue = order::action_order(ctx).into();
        self.phase = Phase::Acting;
    }

    /// Pops queued actors until one can still act.
    fn next_actor(&mut self) -> Option<usize> {
        while let Some(index) = self.queue.pop_front() {
            if let Some(pos) = self.ctx.position(index) {
                if self.ctx.actors[pos].is_alive() {
                    return Some(pos);
                }
            }
        }
        None
    }

    fn wipe_outcome(&self) -> Option<BattleOutcome> {
        if !self.ctx.any_alive(Side::Enemy) {
            return Some(BattleOutcome::Victory);
        }
        if !self.ctx.any_alive(Side::Player) {
            let all_fallen = self
                .ctx
                .actors
                .iter()
                .filter(|actor| actor.side == Side::Player)
                .all(|actor| actor.is_fallen());
            return Some(if all_fallen {
                BattleOutcome::Defeat
            } else {
                BattleOutcome::Retreat
            });
        }
        None
    }

    /// Whether the side wiped out for `outcome` can still stand back up in
    /// this turn's end phase.
    fn revival_pending(&self, outcome: BattleOutcome) -> bool {
        let wiped = match outcome {
            BattleOutcome::Victory => Side::Enemy,
            BattleOutcome::Defeat | BattleOutcome::Retreat => Side::Player,
        };
        self.ctx
            .actors
            .iter()
            .any(|actor| actor.side == wiped && actor.can_self_revive())
    }

    fn turn_end_outcome(&self, retreated: bool) -> Option<BattleOutcome> {
        if let Some(outcome) = self.wipe_outcome() {
            return Some(outcome);
        }
        if retreated || self.ctx.turn >= self.ctx.config.turn_limit {
            return Some(BattleOutcome::Retreat);
        }
        None
    }

    fn conclude(&mut self, outcome: BattleOutcome) {
        let kind = match outcome {
            BattleOutcome::Victory => ActionKind::Victory,
            BattleOutcome::Defeat => ActionKind::Defeat,
            BattleOutcome::Retreat => ActionKind::Retreat,
        };
        self.ctx
            .log
            .announce_with_marker(BattleActionEntry::declare(self.ctx.turn, None, kind));
        self.state = BattleState::from_outcome(outcome);
        self.queue.clear();
    }
}

/// Signed percent in hundredths, stored two's-complement in a `u32` slot.
fn hundredths(percent: f64) -> u32 {
    (percent * 100.0).round() as i32 as u32
}

fn validate_side(seeds: &[BattleActorSeed], side: Side) -> Result<(), SetupError> {
    if seeds.is_empty() {
        return Err(SetupError::EmptySide { side });
    }
    if seeds.len() > BattleConfig::MAX_SIDE_ACTORS {
        return Err(SetupError::TooManyActors {
            side,
            count: seeds.len(),
            max: BattleConfig::MAX_SIDE_ACTORS,
        });
    }
    match seeds.iter().find(|seed| seed.side != side) {
        Some(seed) => Err(SetupError::WrongSide {
            actor: seed.index,
            expected: side,
            found: seed.side,
        }),
        None => Ok(()),
    }
}

/// Charges per known spell: a skill override wins over the spell's own count.
fn starting_charges(seed: &BattleActorSeed, tables: &BattleTables) -> BTreeMap<SpellId, u8> {
    seed.spells
        .iter()
        .map(|id| {
            let charges = seed
                .effects
                .spell
                .charge_overrides
                .get(id)
                .copied()
                .or_else(|| tables.spells.get(id).map(|spell| spell.charges))
                .unwrap_or(0);
            (*id, charges)
        })
        .collect()
}

fn participants(actors: &[BattleActor]) -> Participants {
    let describe = |actor: &BattleActor, label: String| Participant {
        actor: actor.index,
        master_id: actor.master_id,
        level: actor.level,
        max_hp: actor.max_hp,
        label,
    };
    let players = actors
        .iter()
        .filter(|actor| actor.side == Side::Player)
        .map(|actor| describe(actor, String::new()))
        .collect();

    let mut enemies: Vec<&BattleActor> = actors
        .iter()
        .filter(|actor| actor.side == Side::Enemy)
        .collect();
    enemies.sort_by_key(|actor| actor.master_id);
    let ids: Vec<u16> = enemies.iter().map(|actor| actor.master_id).collect();
    let enemies = enemies
        .into_iter()
        .zip(disambiguation_labels(&ids))
        .map(|(actor, label)| describe(actor, label))
        .collect();

    Participants { players, enemies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomMode;
    use crate::effect::ReactionRule;
    use crate::env::{MasterData, SpecialAttackDefinition, SpellDefinition, SpellKind, SpellTarget};
    use crate::log::{DamageFlags, decode_log, encode_log, reconstruct_hp};
    use crate::skills::{BarrierGrant, ChanceRevive, SpecialAttackGrant};
    use crate::stats::CombatSnapshot;
    use crate::types::{
        ActionChoice, Attribute, CombatStat, DamageType, EnemyId, HpScale, ReactionTrigger,
        SpecialAttackId,
    };

    fn snapshot(max_hp: i64, attack: i64, defense: i64) -> CombatSnapshot {
        let mut snapshot = CombatSnapshot::default();
        snapshot.stats[CombatStat::MaxHp] = max_hp;
        snapshot.stats[CombatStat::PhysicalAttack] = attack;
        snapshot.stats[CombatStat::MagicalAttack] = attack;
        snapshot.stats[CombatStat::PhysicalDefense] = defense;
        snapshot.stats[CombatStat::HitScore] = 1000;
        snapshot.stats[CombatStat::AttackCount] = 1;
        snapshot.attributes[Attribute::Agility] = 10;
        snapshot
    }

    fn player(id: u16, snapshot: CombatSnapshot) -> BattleActorSeed {
        BattleActorSeed::new(ActorIndex::player(id), Side::Player, snapshot)
    }

    fn enemy(slot: u16, master: u16, snapshot: CombatSnapshot) -> BattleActorSeed {
        let index = ActorIndex::enemy(slot, EnemyId(master)).expect("valid enemy index");
        BattleActorSeed::new(index, Side::Enemy, snapshot).with_master_id(master)
    }

    fn median() -> BattleConfig {
        BattleConfig::new().with_random_mode(RandomMode::FixedMedian)
    }

    /// Steps until `actor` logs its first entry of `kind`, returning it.
    fn first_entry(
        engine: &mut BattleEngine,
        actor: ActorIndex,
        kind: ActionKind,
    ) -> BattleActionEntry {
        loop {
            let found = engine
                .entries()
                .iter()
                .find(|e| e.kind == kind && e.actor == Some(actor));
            if let Some(entry) = found {
                return entry.clone();
            }
            engine.step().expect("battle keeps running");
        }
    }

    #[test]
    fn median_strike_deals_attack_minus_half_defense() {
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            7,
            vec![player(1, snapshot(1000, 5000, 0))],
            vec![enemy(0, 3, snapshot(100_000, 0, 2000))],
        )
        .unwrap();

        let attack = first_entry(&mut engine, ActorIndex(1), ActionKind::PhysicalAttack);
        assert_eq!(attack.actor, Some(ActorIndex(1)));
        assert_eq!(attack.effects[0].kind, EffectKind::PhysicalDamage);
        assert_eq!(attack.effects[0].value, Some(4000));
    }

    #[test]
    fn ten_percent_dealt_bonus_scales_the_final_hit() {
        let mut seed = player(1, snapshot(1000, 5000, 0));
        seed.effects.damage.dealt[DamageType::Physical].scale(1.1);
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            7,
            vec![seed],
            vec![enemy(0, 3, snapshot(100_000, 0, 2000))],
        )
        .unwrap();

        let attack = first_entry(&mut engine, ActorIndex(1), ActionKind::PhysicalAttack);
        assert_eq!(attack.effects[0].value, Some(4400));
    }

    #[test]
    fn barrier_charge_absorbs_two_thirds_of_one_hit() {
        let mut attacker = snapshot(1000, 5000, 0);
        attacker.stats[CombatStat::AttackCount] = 2;
        let mut defender = enemy(0, 3, snapshot(100_000, 0, 2000));
        defender.effects.combat.barriers.push(BarrierGrant {
            damage_type: DamageType::Physical,
            charges: 1,
        });
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            7,
            vec![player(1, attacker)],
            vec![defender],
        )
        .unwrap();

        let attack = first_entry(&mut engine, ActorIndex(1), ActionKind::PhysicalAttack);
        let hits: Vec<_> = attack
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::PhysicalDamage)
            .map(|e| (e.value, e.damage_flags().contains(DamageFlags::BARRIER)))
            .collect();
        assert_eq!(hits, vec![(Some(1333), true), (Some(4000), false)]);
        let defender = engine.actor(ActorIndex(1003)).unwrap();
        assert_eq!(defender.barrier_charges[DamageType::Physical], 0);
    }

    #[test]
    fn area_spell_is_one_entry_with_one_effect_per_target() {
        let master = MasterData::new().with_spell(SpellDefinition {
            id: SpellId(4),
            kind: SpellKind::Damage,
            target: SpellTarget::AllEnemies,
            power: 1.0,
            charges: 3,
            status: None,
            tier: 1,
        });
        let caster = player(1, snapshot(1000, 3000, 0))
            .with_spells(vec![SpellId(4)])
            .with_action_rate(ActionChoice::Spell, 1.0);
        let mut engine = BattleEngine::new(
            &BattleEnv::with_all(&master),
            median(),
            11,
            vec![caster],
            vec![
                enemy(0, 3, snapshot(100_000, 0, 0)),
                enemy(1, 3, snapshot(100_000, 0, 0)),
            ],
        )
        .unwrap();

        let cast = first_entry(&mut engine, ActorIndex(1), ActionKind::SpellCast);
        assert_eq!(cast.skill_index, Some(4));
        let targets: Vec<_> = cast.effects.iter().map(|e| e.target).collect();
        assert_eq!(
            targets,
            vec![Some(ActorIndex(1003)), Some(ActorIndex(2003))]
        );
        assert_eq!(
            engine.actor(ActorIndex(1)).unwrap().spell_charges[&SpellId(4)],
            2
        );
    }

    #[test]
    fn every_all_target_action_is_one_entry_for_any_field_size() {
        let master = MasterData::new()
            .with_spell(SpellDefinition {
                id: SpellId(4),
                kind: SpellKind::Damage,
                target: SpellTarget::AllEnemies,
                power: 1.0,
                charges: 3,
                status: None,
                tier: 1,
            })
            .with_special_attack(SpecialAttackDefinition {
                id: SpecialAttackId(2),
                damage_type: DamageType::Physical,
                multiplier: 1.0,
                hits: 1,
                target_all: true,
                status: None,
            });

        let spell_caster = player(1, snapshot(100_000, 3000, 0))
            .with_spells(vec![SpellId(4)])
            .with_action_rate(ActionChoice::Spell, 1.0);
        let mut breather = snapshot(100_000, 0, 0);
        breather.stats[CombatStat::BreathDamage] = 500;
        let breather = player(1, breather).with_action_rate(ActionChoice::Breath, 1.0);
        let mut specialist = player(1, snapshot(100_000, 3000, 0));
        specialist
            .effects
            .combat
            .special_attacks
            .push(SpecialAttackGrant {
                id: SpecialAttackId(2),
                chance: 100.0,
            });

        let cases = [
            (spell_caster, ActionKind::SpellCast, EffectKind::MagicalDamage),
            (breather, ActionKind::Breath, EffectKind::BreathDamage),
            (specialist, ActionKind::SpecialAttack, EffectKind::PhysicalDamage),
        ];

        for (actor, kind, damage) in cases {
            for count in 1..=BattleConfig::MAX_SIDE_ACTORS {
                let enemies: Vec<_> = (0..count as u16)
                    .map(|slot| {
                        let mut seed = enemy(slot, 3, snapshot(1_000_000, 0, 0));
                        seed.effects.combat.reactions.push(ReactionRule {
                            trigger: ReactionTrigger::Damaged,
                            damage_type: None,
                            chance: 100.0,
                            attack_ratio: ReactionRule::COUNTER_RATIO,
                        });
                        seed
                    })
                    .collect();
                let expected: Vec<_> = enemies.iter().map(|seed| Some(seed.index)).collect();
                let mut engine = BattleEngine::new(
                    &BattleEnv::with_all(&master),
                    median(),
                    19,
                    vec![actor.clone()],
                    enemies,
                )
                .unwrap();

                let entry = first_entry(&mut engine, ActorIndex(1), kind);
                let targets: Vec<_> = entry
                    .effects
                    .iter()
                    .filter(|e| e.kind == damage)
                    .map(|e| e.target)
                    .collect();
                assert_eq!(targets, expected, "{kind} against {count}");

                let entries = engine.entries();
                let at = entries.iter().position(|e| *e == entry).unwrap();
                assert_eq!(
                    entries.iter().filter(|e| e.kind == kind).count(),
                    1,
                    "{kind} against {count}"
                );
                let counters: Vec<_> = entries[at + 1..]
                    .iter()
                    .filter(|e| e.kind == ActionKind::Counter)
                    .map(|e| e.actor)
                    .collect();
                assert_eq!(counters, expected, "{kind} against {count}");
            }
        }
    }

    #[test]
    fn active_resurrection_revives_at_five_percent() {
        let mut seed = player(1, snapshot(1000, 0, 0));
        seed.effects.misc.end_of_turn_hp_delta_percent = -100.0;
        seed.effects.resurrection.active.push(ChanceRevive {
            chance: 100.0,
            hp_scale: HpScale::MaxHp5Percent,
        });
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            3,
            vec![seed],
            vec![enemy(0, 3, snapshot(100_000, 0, 0))],
        )
        .unwrap();

        let revive = first_entry(&mut engine, ActorIndex(1), ActionKind::Resurrection);
        assert_eq!(revive.effects[0].kind, EffectKind::Resurrected);
        assert_eq!(revive.effects[0].value, Some(50));
        assert_eq!(engine.actor(ActorIndex(1)).unwrap().hp, 50);
        assert!(!engine.state().is_finished());
    }

    #[test]
    fn party_struck_down_mid_turn_still_gets_its_turn_end_resurrection() {
        let mut seed = player(1, snapshot(1000, 0, 0));
        seed.effects.resurrection.active.push(ChanceRevive {
            chance: 100.0,
            hp_scale: HpScale::MaxHp5Percent,
        });
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            3,
            vec![seed],
            vec![enemy(0, 3, snapshot(100_000, 50_000, 0))],
        )
        .unwrap();

        let strike = first_entry(&mut engine, ActorIndex(1003), ActionKind::PhysicalAttack);
        let last = strike.effects.last().unwrap();
        assert_eq!(last.kind, EffectKind::Defeated);
        assert_eq!(last.target, Some(ActorIndex(1)));
        assert!(!engine.state().is_finished());

        let revive = first_entry(&mut engine, ActorIndex(1), ActionKind::Resurrection);
        assert_eq!(revive.turn, 1);
        assert_eq!(revive.effects[0].value, Some(50));
        assert!(!engine.state().is_finished());
        assert!(engine.entries().iter().all(|e| e.kind != ActionKind::Defeat));
    }

    #[test]
    fn party_without_revival_is_defeated_by_the_killing_strike() {
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            3,
            vec![player(1, snapshot(1000, 0, 0))],
            vec![enemy(0, 3, snapshot(100_000, 50_000, 0))],
        )
        .unwrap();

        loop {
            let outcome = engine.step().unwrap();
            if outcome.is_final() {
                assert_eq!(outcome.kind, StepKind::Action(ActorIndex(1003)));
                break;
            }
        }
        assert_eq!(engine.state(), BattleState::Defeated);
    }

    #[test]
    fn same_seed_reproduces_the_same_bytes() {
        let build = || {
            BattleEngine::new(
                &BattleEnv::empty(),
                BattleConfig::new(),
                0xDEC0DE,
                vec![
                    player(1, snapshot(900, 300, 50)),
                    player(2, snapshot(700, 250, 40)),
                ],
                vec![
                    enemy(0, 5, snapshot(1200, 200, 60)),
                    enemy(1, 5, snapshot(1200, 200, 60)),
                ],
            )
            .unwrap()
            .run()
            .unwrap()
        };
        let (first, violations) = build();
        let (second, _) = build();
        assert!(violations.is_empty());
        assert_eq!(encode_log(&first).unwrap(), encode_log(&second).unwrap());
        assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    }

    #[test]
    fn replayed_hp_matches_the_engine_and_the_codec_round_trips() {
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            BattleConfig::new(),
            42,
            vec![player(1, snapshot(900, 300, 50))],
            vec![
                enemy(0, 5, snapshot(800, 200, 60)),
                enemy(1, 6, snapshot(600, 150, 30)),
            ],
        )
        .unwrap();
        while !engine.state().is_finished() {
            engine.step().unwrap();
        }
        let live: BTreeMap<ActorIndex, u32> = engine
            .actors()
            .iter()
            .map(|actor| (actor.index, actor.hp))
            .collect();
        let (log, violations) = engine.finish().unwrap();
        assert!(violations.is_empty());
        assert_eq!(reconstruct_hp(&log).final_hp, live);

        let bytes = encode_log(&log).unwrap();
        assert_eq!(decode_log(&bytes).unwrap(), log);
    }

    #[test]
    fn overwhelming_party_wins_and_log_ends_with_victory() {
        let (log, _) = BattleEngine::new(
            &BattleEnv::empty(),
            median(),
            1,
            vec![player(1, snapshot(1000, 50_000, 0))],
            vec![enemy(0, 3, snapshot(100, 0, 0))],
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(log.outcome, BattleOutcome::Victory);
        assert_eq!(log.turns, 1);
        let last = log.entries.last().unwrap();
        assert_eq!(last.kind, ActionKind::Victory);
        assert_eq!(last.actor, None);
        let kill = log
            .entries
            .iter()
            .find(|e| e.kind == ActionKind::PhysicalAttack)
            .unwrap();
        assert_eq!(kill.effects.last().unwrap().kind, EffectKind::Defeated);
    }

    #[test]
    fn stalemate_retreats_at_the_turn_limit() {
        let (log, _) = BattleEngine::new(
            &BattleEnv::empty(),
            median().with_turn_limit(3),
            1,
            vec![player(1, snapshot(100_000, 0, 0))],
            vec![enemy(0, 3, snapshot(100_000, 0, 0))],
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(log.outcome, BattleOutcome::Retreat);
        assert_eq!(log.turns, 3);
        assert_eq!(log.entries_in_turn(2).next().unwrap().kind, ActionKind::TurnStart);
    }

    #[test]
    fn finished_battle_rejects_further_steps() {
        let mut engine = BattleEngine::new(
            &BattleEnv::empty(),
            median().with_turn_limit(1),
            1,
            vec![player(1, snapshot(100_000, 0, 0))],
            vec![enemy(0, 3, snapshot(100_000, 0, 0))],
        )
        .unwrap();
        assert!(matches!(
            engine.clone().finish(),
            Err(BattleError::NotFinished {
                state: BattleState::NotStarted
            })
        ));
        while !engine.step().unwrap().is_final() {}
        assert!(matches!(
            engine.step(),
            Err(BattleError::AlreadyFinished {
                state: BattleState::Retreated
            })
        ));
    }

    #[test]
    fn setup_rejects_bad_rosters() {
        let env = BattleEnv::empty();
        let err = BattleEngine::new(
            &env,
            BattleConfig::new(),
            1,
            vec![player(1, snapshot(10, 1, 1))],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BattleError::Setup(SetupError::EmptySide { side: Side::Enemy })
        );

        let err = BattleEngine::new(
            &env,
            BattleConfig::new(),
            1,
            vec![
                player(1, snapshot(10, 1, 1)),
                player(1, snapshot(10, 1, 1)),
            ],
            vec![enemy(0, 3, snapshot(10, 1, 1))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BattleError::Setup(SetupError::DuplicateActor {
                actor: ActorIndex(1)
            })
        );

        let err = BattleEngine::new(
            &env,
            BattleConfig::new(),
            1,
            vec![player(1, snapshot(10, 1, 1))],
            vec![player(2, snapshot(10, 1, 1))],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BattleError::Setup(SetupError::WrongSide { .. })
        ));
    }

    #[test]
    fn missing_spell_definition_fails_setup() {
        let caster = player(1, snapshot(10, 1, 1)).with_spells(vec![SpellId(9)]);
        let err = BattleEngine::new(
            &BattleEnv::with_all(&MasterData::new()),
            BattleConfig::new(),
            1,
            vec![caster],
            vec![enemy(0, 3, snapshot(10, 1, 1))],
        )
        .unwrap_err();
        assert!(matches!(err, BattleError::Oracle(_)));
    }

    #[test]
    fn duplicate_enemies_get_labels_in_master_order() {
        let engine = BattleEngine::new(
            &BattleEnv::empty(),
            BattleConfig::new(),
            1,
            vec![player(1, snapshot(10, 1, 1))],
            vec![
                enemy(0, 8, snapshot(10, 1, 1)),
                enemy(1, 2, snapshot(10, 1, 1)),
                enemy(2, 8, snapshot(10, 1, 1)),
            ],
        )
        .unwrap();
        let labels: Vec<_> = engine
            .participants()
            .enemies
            .iter()
            .map(|p| (p.master_id, p.label.as_str()))
            .collect();
        assert_eq!(labels, vec![(2, ""), (8, "A"), (8, "B")]);
    }
}
