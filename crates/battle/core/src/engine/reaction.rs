//! Reactions and rescues.
//!
//! A strike never resolves a reaction inline: it only queues [`Pending`]
//! work, and the queue drains after the causing entry has closed. This keeps
//! each action in exactly one entry. Every queued reaction carries its chain
//! depth, and nothing is queued past `BattleConfig::max_reaction_depth`.

use crate::env::RollContext;
use crate::log::{ActionKind, BattleActionEntry, BattleEffect, EffectKind};
use crate::types::{ActorIndex, DamageType, ReactionTrigger, Side};

use super::context::BattleContext;
use super::resolve::{self, Strike};

/// Work a strike left for after its entry closes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Pending {
    Reaction {
        reactor: ActorIndex,
        target: ActorIndex,
        kind: ActionKind,
        chance: f64,
        ratio: f64,
        depth: u8,
    },
    Rescue {
        fallen: ActorIndex,
    },
}

const fn reaction_kind(trigger: ReactionTrigger) -> ActionKind {
    match trigger {
        ReactionTrigger::Damaged | ReactionTrigger::Evaded => ActionKind::Counter,
        ReactionTrigger::AllyAttacked => ActionKind::FollowUp,
        ReactionTrigger::AllyDefeated => ActionKind::Retaliation,
    }
}

/// Queues every rule of the actor at `reactor` that `trigger` fires.
///
/// `damage_type` narrows `Damaged` rules that name a channel.
pub(crate) fn queue_reactions(
    ctx: &mut BattleContext,
    reactor: usize,
    target: ActorIndex,
    trigger: ReactionTrigger,
    damage_type: Option<DamageType>,
    depth: u8,
) {
    if depth >= ctx.config.max_reaction_depth {
        return;
    }
    for slot in 0..ctx.actors[reactor].effects.combat.reactions.len() {
        let rule = ctx.actors[reactor].effects.combat.reactions[slot];
        if !rule.fires_on(trigger, damage_type) {
            continue;
        }
        let chance = ctx.actors[reactor].effects.combat.proc_chance(rule.chance);
        ctx.pending.push_back(Pending::Reaction {
            reactor: ctx.actors[reactor].index,
            target,
            kind: reaction_kind(trigger),
            chance,
            ratio: rule.attack_ratio,
            depth: depth + 1,
        });
    }
}

/// Queues `trigger` for every living ally of the actor at `pos`.
pub(crate) fn queue_ally_reactions(
    ctx: &mut BattleContext,
    pos: usize,
    target: ActorIndex,
    trigger: ReactionTrigger,
    depth: u8,
) {
    let side = ctx.actors[pos].side;
    for ally in ctx.living(side) {
        if ally != pos {
            queue_reactions(ctx, ally, target, trigger, None, depth);
        }
    }
}

/// Resolves queued work in order until the queue is empty.
pub(crate) fn drain(ctx: &mut BattleContext) {
    while let Some(pending) = ctx.pending.pop_front() {
        if !ctx.any_alive(Side::Player) || !ctx.any_alive(Side::Enemy) {
            ctx.pending.clear();
            return;
        }
        match pending {
            Pending::Reaction {
                reactor,
                target,
                kind,
                chance,
                ratio,
                depth,
            } => react(ctx, reactor, target, kind, chance, ratio, depth),
            Pending::Rescue { fallen } => rescue(ctx, fallen),
        }
    }
}

fn react(
    ctx: &mut BattleContext,
    reactor: ActorIndex,
    target: ActorIndex,
    kind: ActionKind,
    chance: f64,
    ratio: f64,
    depth: u8,
) {
    let (Some(r), Some(t)) = (ctx.position(reactor), ctx.position(target)) else {
        return;
    };
    if !ctx.actors[r].is_alive() || !ctx.actors[t].is_alive() || resolve::incapacitated(ctx, r) {
        return;
    }
    if !ctx.roll(reactor, RollContext::Reaction, chance) {
        return;
    }

    let hits = ((ctx.actors[r].snapshot.attack_count() as f64 * ratio) as u32).max(1);
    ctx.log.declare(BattleActionEntry::declare(ctx.turn, Some(reactor), kind));
    for _ in 0..hits {
        if !ctx.actors[t].is_alive() {
            break;
        }
        resolve::strike(ctx, r, t, &Strike::physical(depth));
    }
    ctx.log.close();
}

/// Lets living allies of `fallen` try their rescue rules; the first success wins.
fn rescue(ctx: &mut BattleContext, fallen: ActorIndex) {
    let Some(f) = ctx.position(fallen) else {
        return;
    };
    if !ctx.actors[f].is_fallen() {
        return;
    }
    for ally in ctx.living(ctx.actors[f].side) {
        let rescuer = ctx.actors[ally].index;
        let rules = ctx.actors[ally].effects.resurrection.rescue.clone();
        for rule in rules {
            if !ctx.roll(rescuer, RollContext::Resurrection, rule.chance) {
                continue;
            }
            let hp = ctx.actors[f].revive_hp(rule.hp_scale);
            ctx.actors[f].revive(hp);
            ctx.log.declare(BattleActionEntry::declare(
                ctx.turn,
                Some(rescuer),
                ActionKind::Rescue,
            ));
            ctx.log
                .push(BattleEffect::on(EffectKind::Rescued, fallen).with_value(ctx.actors[f].hp));
            ctx.log.close();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};

    use super::*;
    use crate::config::BattleConfig;
    use crate::effect::ReactionRule;
    use crate::engine::actor::{BattleActor, BattleActorSeed};
    use crate::engine::context::BattleTables;
    use crate::env::BattleRng;
    use crate::log::LogBuilder;
    use crate::stats::CombatSnapshot;

    const ATTACKER: ActorIndex = ActorIndex(1003);

    fn rule(trigger: ReactionTrigger, damage_type: Option<DamageType>) -> ReactionRule {
        ReactionRule {
            trigger,
            damage_type,
            chance: 40.0,
            attack_ratio: ReactionRule::default_ratio(trigger),
        }
    }

    fn context(rules: Vec<ReactionRule>) -> BattleContext {
        let mut seed =
            BattleActorSeed::new(ActorIndex::player(1), Side::Player, CombatSnapshot::default());
        seed.effects.combat.reactions = rules;
        BattleContext {
            config: BattleConfig::new(),
            tables: BattleTables::default(),
            actors: vec![BattleActor::from_seed(seed, BTreeMap::new())],
            rng: BattleRng::new(1),
            log: LogBuilder::new(BTreeMap::new()),
            turn: 1,
            pending: VecDeque::new(),
        }
    }

    #[test]
    fn only_matching_rules_are_queued_in_grant_order() {
        let mut ctx = context(vec![
            rule(ReactionTrigger::Damaged, Some(DamageType::Physical)),
            rule(ReactionTrigger::Damaged, Some(DamageType::Magical)),
            rule(ReactionTrigger::Evaded, None),
            rule(ReactionTrigger::Damaged, None),
        ]);

        queue_reactions(
            &mut ctx,
            0,
            ATTACKER,
            ReactionTrigger::Damaged,
            Some(DamageType::Physical),
            0,
        );

        let queued: Vec<_> = ctx.pending.iter().copied().collect();
        let counter = Pending::Reaction {
            reactor: ActorIndex(1),
            target: ATTACKER,
            kind: ActionKind::Counter,
            chance: 40.0,
            ratio: ReactionRule::COUNTER_RATIO,
            depth: 1,
        };
        assert_eq!(queued, vec![counter, counter]);
    }

    #[test]
    fn nothing_is_queued_at_the_depth_cap() {
        let mut ctx = context(vec![rule(ReactionTrigger::Damaged, None)]);
        let cap = ctx.config.max_reaction_depth;

        queue_reactions(&mut ctx, 0, ATTACKER, ReactionTrigger::Damaged, None, cap);

        assert!(ctx.pending.is_empty());
    }
}
