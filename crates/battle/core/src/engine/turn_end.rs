//! End-of-turn phases.
//!
//! Phases run in a fixed order, each over the whole roster in roster order:
//! buff tick, healing, self HP delta, status ticks, resurrection,
//! necromancy, sacrifice, charge recovery, retreat, runaway, repair.
//! Rescues triggered by a death in one phase drain before the next phase.

use crate::env::RollContext;
use crate::log::{ActionKind, BattleActionEntry, BattleEffect, EffectKind};
use crate::types::{ActorIndex, HpScale, Side};

use super::context::BattleContext;
use super::damage::percent_of_max_hp;
use super::reaction::{self, Pending};

/// Runs every end-of-turn phase. Returns whether the party retreated.
pub(crate) fn run(ctx: &mut BattleContext) -> bool {
    let before: [fn(&mut BattleContext); 8] = [
        tick_buffs,
        turn_end_heal,
        self_hp_delta,
        tick_statuses,
        resurrect,
        necromancy,
        sacrifice,
        recover_charges,
    ];
    for phase in before {
        phase(ctx);
        reaction::drain(ctx);
    }
    let retreated = retreat_at_turn(ctx);
    runaway(ctx);
    repair_degradation(ctx);
    retreated
}

/// Opens an entry for the actor at `pos` unless this phase already did.
fn open_once(ctx: &mut BattleContext, opened: &mut bool, pos: usize, kind: ActionKind) {
    if !*opened {
        let entry = BattleActionEntry::declare(ctx.turn, Some(ctx.actors[pos].index), kind);
        ctx.log.declare(entry);
        *opened = true;
    }
}

fn tick_buffs(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() || ctx.actors[pos].buffs.is_empty() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let mut expired = Vec::new();
        ctx.actors[pos].buffs.retain_mut(|buff| {
            buff.remaining = buff.remaining.saturating_sub(1);
            if buff.remaining == 0 {
                expired.push(buff.kind);
                false
            } else {
                true
            }
        });
        if expired.is_empty() {
            continue;
        }
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(index),
            ActionKind::BuffTick,
        ));
        for kind in expired {
            ctx.log
                .push(BattleEffect::on(EffectKind::BuffExpired, index).with_extra(kind as u32));
        }
        ctx.log.close();
    }
}

fn turn_end_heal(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        let actor = &mut ctx.actors[pos];
        let percent = actor.effects.misc.end_of_turn_heal_percent;
        if !actor.is_alive() || percent <= 0.0 {
            continue;
        }
        let index = actor.index;
        let applied = actor.heal(percent_of_max_hp(actor.max_hp, percent));
        if applied == 0 {
            continue;
        }
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(index),
            ActionKind::TurnEndHeal,
        ));
        ctx.log
            .push(BattleEffect::on(EffectKind::Heal, index).with_value(applied));
        ctx.log.close();
    }
}

fn self_hp_delta(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        let actor = &mut ctx.actors[pos];
        let percent = actor.effects.misc.end_of_turn_hp_delta_percent;
        if !actor.is_alive() || percent == 0.0 {
            continue;
        }
        let index = actor.index;
        if percent > 0.0 {
            let applied = actor.heal(percent_of_max_hp(actor.max_hp, percent));
            if applied > 0 {
                ctx.log.declare(BattleActionEntry::declare(
                    ctx.turn,
                    Some(index),
                    ActionKind::SelfHpDelta,
                ));
                ctx.log
                    .push(BattleEffect::on(EffectKind::Heal, index).with_value(applied));
                ctx.log.close();
            }
            continue;
        }

        let loss = percent_of_max_hp(actor.max_hp, -percent).min(actor.hp);
        actor.hp -= loss;
        let died = actor.hp == 0;
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(index),
            ActionKind::SelfHpDelta,
        ));
        ctx.log
            .push(BattleEffect::on(EffectKind::SelfDamage, index).with_value(loss));
        if died {
            fall(ctx, pos);
        }
        ctx.log.close();
    }
}

/// Kills the actor at `pos` inside the open entry and queues its rescue.
fn fall(ctx: &mut BattleContext, pos: usize) {
    let index = ctx.actors[pos].index;
    ctx.actors[pos].fall();
    ctx.log.record_kill(ctx.turn, None, index);
    ctx.pending.push_back(Pending::Rescue { fallen: index });
}

fn tick_statuses(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() || ctx.actors[pos].statuses.is_empty() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let mut opened = false;
        let active: Vec<_> = ctx.actors[pos].statuses.iter().copied().collect();
        for status in active {
            let tick = ctx
                .tables
                .statuses
                .get(&status.id)
                .map_or(0.0, |def| def.tick_damage_percent);
            if tick > 0.0 {
                let actor = &mut ctx.actors[pos];
                let damage = percent_of_max_hp(actor.max_hp, tick).min(actor.hp);
                actor.hp -= damage;
                let died = actor.hp == 0;
                open_once(ctx, &mut opened, pos, ActionKind::StatusTick);
                ctx.log.push(
                    BattleEffect::on(EffectKind::StatusTickDamage, index)
                        .with_value(damage)
                        .with_status(status.id),
                );
                if died {
                    fall(ctx, pos);
                    break;
                }
            }

            let actor = &mut ctx.actors[pos];
            let Some(slot) = actor.statuses.iter().position(|s| s.id == status.id) else {
                continue;
            };
            actor.statuses[slot].remaining = actor.statuses[slot].remaining.saturating_sub(1);
            if actor.statuses[slot].remaining == 0 {
                actor.statuses.remove(slot);
                open_once(ctx, &mut opened, pos, ActionKind::StatusTick);
                ctx.log
                    .push(BattleEffect::on(EffectKind::StatusRecovered, index).with_status(status.id));
            }
        }
        if opened {
            ctx.log.close();
        }
    }
}

fn log_revive(ctx: &mut BattleContext, actor: ActorIndex, kind: ActionKind, revived: usize) {
    let target = ctx.actors[revived].index;
    let hp = ctx.actors[revived].hp;
    ctx.log
        .declare(BattleActionEntry::declare(ctx.turn, Some(actor), kind));
    ctx.log
        .push(BattleEffect::on(EffectKind::Resurrected, target).with_value(hp));
    ctx.log.close();
}

/// Self-revival: `active` rules roll in grant order; failing those, the best
/// `forced` scale revives once per battle.
fn resurrect(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_fallen() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let rules = ctx.actors[pos].effects.resurrection.active.clone();
        let mut scale = None;
        for rule in rules {
            if ctx.roll(index, RollContext::Resurrection, rule.chance) {
                scale = Some(rule.hp_scale);
                break;
            }
        }
        let actor = &mut ctx.actors[pos];
        if scale.is_none() && !actor.forced_revive_used {
            scale = actor.effects.resurrection.forced.iter().copied().max();
            actor.forced_revive_used = scale.is_some();
        }
        if let Some(scale) = scale {
            let hp = actor.revive_hp(scale);
            actor.revive(hp);
            log_revive(ctx, index, ActionKind::Resurrection, pos);
        }
    }
}

fn necromancy(ctx: &mut BattleContext) {
    let turn = ctx.turn;
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let side = ctx.actors[pos].side;
        let rules = ctx.actors[pos].effects.resurrection.necromancer.clone();
        for rule in rules {
            if rule.interval == 0 || turn % rule.interval != 0 {
                continue;
            }
            let Some(&fallen) = ctx.fallen(side).first() else {
                break;
            };
            revive_with(ctx, fallen, rule.hp_scale);
            log_revive(ctx, index, ActionKind::Necromancy, fallen);
        }
    }
}

fn revive_with(ctx: &mut BattleContext, pos: usize, scale: HpScale) {
    let hp = ctx.actors[pos].revive_hp(scale);
    ctx.actors[pos].revive(hp);
}

/// On an interval turn the holder trades its weakest living ally for the
/// first fallen one, which comes back with the victim's HP.
fn sacrifice(ctx: &mut BattleContext) {
    let turn = ctx.turn;
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() {
            continue;
        }
        let due = ctx.actors[pos]
            .effects
            .resurrection
            .sacrifice_intervals
            .iter()
            .any(|interval| *interval > 0 && turn % interval == 0);
        if !due {
            continue;
        }
        let side = ctx.actors[pos].side;
        let Some(&fallen) = ctx.fallen(side).first() else {
            continue;
        };
        let victim = ctx
            .living(side)
            .into_iter()
            .filter(|ally| *ally != pos)
            .min_by(|a, b| ctx.actors[*a].hp.cmp(&ctx.actors[*b].hp).then(a.cmp(b)));
        let Some(victim) = victim else {
            continue;
        };

        let hp = ctx.actors[victim].hp;
        ctx.actors[victim].fall();
        ctx.actors[fallen].revive(hp);
        let holder = ctx.actors[pos].index;
        let victim_index = ctx.actors[victim].index;
        let fallen_index = ctx.actors[fallen].index;
        let revived_hp = ctx.actors[fallen].hp;
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(holder),
            ActionKind::Sacrifice,
        ));
        ctx.log
            .push(BattleEffect::on(EffectKind::Sacrificed, victim_index).with_value(hp));
        ctx.log
            .push(BattleEffect::on(EffectKind::Resurrected, fallen_index).with_value(revived_hp));
        ctx.log.close();
    }
}

/// Each recovery rule rolls once; on success every listed spell below its
/// starting charge regains one. An empty list covers all known spells.
fn recover_charges(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let rules = ctx.actors[pos].effects.spell.charge_recovery.clone();
        let mut opened = false;
        for rule in rules {
            if !ctx.roll(index, RollContext::ChargeRecovery, rule.chance) {
                continue;
            }
            let spells = if rule.spells.is_empty() {
                ctx.actors[pos].spells.clone()
            } else {
                rule.spells
            };
            for spell in spells {
                let actor = &mut ctx.actors[pos];
                let max = actor.max_spell_charges.get(&spell).copied().unwrap_or(0);
                let Some(charges) = actor.spell_charges.get_mut(&spell) else {
                    continue;
                };
                if *charges >= max {
                    continue;
                }
                *charges += 1;
                let now = *charges;
                open_once(ctx, &mut opened, pos, ActionKind::SpellChargeRecovery);
                ctx.log.push(
                    BattleEffect::on(EffectKind::ChargeRecovered, index)
                        .with_value(u32::from(spell.0))
                        .with_extra(u32::from(now)),
                );
            }
        }
        if opened {
            ctx.log.close();
        }
    }
}

fn flee(ctx: &mut BattleContext, pos: usize) {
    let index = ctx.actors[pos].index;
    ctx.actors[pos].fled = true;
    ctx.log.declare(BattleActionEntry::declare(
        ctx.turn,
        Some(index),
        ActionKind::Runaway,
    ));
    ctx.log.push(BattleEffect::on(EffectKind::Fled, index));
    ctx.log.close();
}

/// A living player whose retreat turn has come pulls the whole party out; an
/// enemy in the same position leaves the field alone.
fn retreat_at_turn(ctx: &mut BattleContext) -> bool {
    let mut party_retreat = false;
    for pos in 0..ctx.actors.len() {
        let actor = &ctx.actors[pos];
        let side = actor.side;
        let due = actor
            .effects
            .misc
            .retreat_at_turn
            .is_some_and(|turn| ctx.turn >= turn);
        if !actor.is_alive() || !due {
            continue;
        }
        match side {
            Side::Player => party_retreat = true,
            Side::Enemy => flee(ctx, pos),
        }
    }
    party_retreat
}

fn runaway(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        if !ctx.actors[pos].is_alive() {
            continue;
        }
        let index = ctx.actors[pos].index;
        let rules = ctx.actors[pos].effects.misc.runaway.clone();
        for rule in rules {
            if ctx.actors[pos].hp_percent() > rule.threshold_percent {
                continue;
            }
            if ctx.roll(index, RollContext::Runaway, rule.chance) {
                flee(ctx, pos);
                break;
            }
        }
    }
}

fn repair_degradation(ctx: &mut BattleContext) {
    for pos in 0..ctx.actors.len() {
        let actor = &ctx.actors[pos];
        let chance = actor.effects.misc.degradation_repair_chance;
        if !actor.is_alive() || actor.degradation == 0 || chance <= 0.0 {
            continue;
        }
        let index = actor.index;
        if !ctx.roll(index, RollContext::Repair, chance) {
            continue;
        }
        let steps = std::mem::take(&mut ctx.actors[pos].degradation);
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(index),
            ActionKind::DegradationRepair,
        ));
        ctx.log
            .push(BattleEffect::on(EffectKind::Repaired, index).with_value(u32::from(steps)));
        ctx.log.close();
    }
}
