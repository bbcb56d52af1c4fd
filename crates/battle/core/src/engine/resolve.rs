//! Action resolution.
//!
//! Every action opens exactly one entry, appends one effect per observable
//! result in the order it happens, and closes the entry before any reaction it
//! caused runs. Per strike the order is fixed: accuracy, parry, block,
//! critical, damage, barrier, HP, absorption, death, then status infliction.

use crate::config::BattleConfig;
use crate::env::{RollContext, SpellKind};
use crate::log::{ActionKind, BattleActionEntry, BattleEffect, DamageFlags, EffectKind};
use crate::types::{
    BuffKind, CombatStat, DamageType, ReactionTrigger, RowProfile, Side, SpecialAttackId, SpellId,
    StatusId,
};

use super::actor::ActiveStatus;
use super::context::BattleContext;
use super::damage::{self, DamageFactors};
use super::reaction::{self, Pending};
use super::select::{self, ActionPlan};

/// Shape of one strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Strike {
    pub damage_type: DamageType,
    /// Scales the attack stat: spell power, 1.0 otherwise.
    pub power: f64,
    /// Share of a full strike.
    pub ratio: f64,
    pub evadable: bool,
    pub parryable: bool,
    pub can_critical: bool,
    /// Whether the attacker's status inflictions ride on a landed hit.
    pub inflicts: bool,
    pub depth: u8,
}

impl Strike {
    pub fn physical(depth: u8) -> Self {
        Self {
            damage_type: DamageType::Physical,
            power: 1.0,
            ratio: 1.0,
            evadable: true,
            parryable: true,
            can_critical: true,
            inflicts: true,
            depth,
        }
    }

    fn spell(power: f64) -> Self {
        Self {
            damage_type: DamageType::Magical,
            power,
            ratio: 1.0,
            evadable: false,
            parryable: false,
            can_critical: false,
            inflicts: false,
            depth: 0,
        }
    }

    fn breath() -> Self {
        Self {
            damage_type: DamageType::Breath,
            power: 1.0,
            ratio: 1.0,
            evadable: true,
            parryable: false,
            can_critical: false,
            inflicts: false,
            depth: 0,
        }
    }

    fn special(damage_type: DamageType, multiplier: f64) -> Self {
        Self {
            damage_type,
            power: 1.0,
            ratio: multiplier,
            evadable: damage_type != DamageType::Magical,
            parryable: damage_type == DamageType::Physical,
            can_critical: damage_type == DamageType::Physical,
            inflicts: false,
            depth: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StrikeResult {
    Evaded,
    Parried,
    Landed { killed: bool },
}

const fn damage_effect(damage_type: DamageType) -> EffectKind {
    match damage_type {
        DamageType::Physical => EffectKind::PhysicalDamage,
        DamageType::Magical => EffectKind::MagicalDamage,
        DamageType::Breath => EffectKind::BreathDamage,
    }
}

/// A status that forbids acting, if the actor at `pos` carries one.
fn blocking_status(ctx: &BattleContext, pos: usize) -> Option<StatusId> {
    ctx.actors[pos]
        .statuses
        .iter()
        .find(|status| {
            ctx.tables
                .statuses
                .get(&status.id)
                .is_some_and(|def| def.prevents_action)
        })
        .map(|status| status.id)
}

pub(crate) fn incapacitated(ctx: &BattleContext, pos: usize) -> bool {
    blocking_status(ctx, pos).is_some()
}

/// The actor at `pos` takes its turn: one action, then any extra actions it
/// rolls. Reactions drain after every action.
pub(crate) fn take_turn(ctx: &mut BattleContext, pos: usize) {
    if !ctx.actors[pos].is_alive() {
        return;
    }
    act(ctx, pos);
    reaction::drain(ctx);

    let index = ctx.actors[pos].index;
    let grants = ctx.actors[pos].effects.combat.extra_actions.clone();
    for grant in grants {
        let chance = ctx.actors[pos].effects.combat.proc_chance(grant.chance);
        if !ctx.roll(index, RollContext::ExtraAction, chance) {
            continue;
        }
        for _ in 0..grant.count {
            if !ctx.actors[pos].is_alive() || side_wiped(ctx) {
                return;
            }
            act(ctx, pos);
            reaction::drain(ctx);
        }
    }
}

fn side_wiped(ctx: &BattleContext) -> bool {
    !ctx.any_alive(Side::Player) || !ctx.any_alive(Side::Enemy)
}

fn act(ctx: &mut BattleContext, pos: usize) {
    let index = ctx.actors[pos].index;
    if let Some(status) = blocking_status(ctx, pos) {
        ctx.log.declare(BattleActionEntry::declare(
            ctx.turn,
            Some(index),
            ActionKind::Incapacitated,
        ));
        ctx.log.push(BattleEffect::on(EffectKind::ActionSkipped, index).with_status(status));
        ctx.log.close();
        return;
    }

    match select::choose_action(ctx, pos) {
        ActionPlan::Attack => physical_attack(ctx, pos),
        ActionPlan::Spell(id) => cast_spell(ctx, pos, id),
        ActionPlan::Breath => breathe(ctx, pos),
        ActionPlan::Special(id) => special_attack(ctx, pos, id),
    }
}

fn physical_attack(ctx: &mut BattleContext, pos: usize) {
    let Some(pick) = select::pick_target(ctx, pos, true) else {
        return;
    };
    let index = ctx.actors[pos].index;
    ctx.log.declare(BattleActionEntry::declare(
        ctx.turn,
        Some(index),
        ActionKind::PhysicalAttack,
    ));
    push_cover(ctx, pick.target, pick.covered);

    let hits = ctx.actors[pos].snapshot.attack_count().max(1);
    for _ in 0..hits {
        if !ctx.actors[pick.target].is_alive() || !ctx.actors[pos].is_alive() {
            break;
        }
        strike(ctx, pos, pick.target, &Strike::physical(0));
    }
    ctx.log.close();

    if ctx.actors[pick.target].is_alive() && ctx.actors[pos].is_alive() {
        let target = ctx.actors[pick.target].index;
        reaction::queue_ally_reactions(ctx, pos, target, ReactionTrigger::AllyAttacked, 0);
    }
}

fn push_cover(ctx: &mut BattleContext, coverer: usize, covered: Option<usize>) {
    if let Some(covered) = covered {
        let effect = BattleEffect::on(EffectKind::Cover, ctx.actors[coverer].index)
            .with_extra(u32::from(ctx.actors[covered].index.0));
        ctx.log.push(effect);
    }
}

fn cast_spell(ctx: &mut BattleContext, pos: usize, id: SpellId) {
    let Some(spell) = ctx.tables.spells.get(&id).cloned() else {
        return;
    };
    let targets = select::spell_targets(ctx, pos, spell.target);
    if targets.is_empty() {
        return;
    }
    let actor = &mut ctx.actors[pos];
    let index = actor.index;
    if let Some(charges) = actor.spell_charges.get_mut(&id) {
        *charges = charges.saturating_sub(1);
    }
    let power = spell.power * actor.effects.spell.power_for(id);
    let healing = actor.effects.spell.healing.value();

    ctx.log.declare(
        BattleActionEntry::declare(ctx.turn, Some(index), ActionKind::SpellCast)
            .with_skill_index(u16::from(id.0)),
    );
    for target in targets {
        match spell.kind {
            SpellKind::Damage => {
                if !ctx.actors[target].is_alive() {
                    continue;
                }
                let result = strike(ctx, pos, target, &Strike::spell(power));
                if let (Some(status), StrikeResult::Landed { killed: false, .. }) =
                    (spell.status, result)
                {
                    try_inflict(ctx, pos, target, status, 100.0);
                }
            }
            SpellKind::Heal => {
                let amount = ctx.actors[pos].stat(CombatStat::MagicalHealing) * power * healing;
                let applied = ctx.actors[target].heal(amount.max(0.0) as u32);
                let target_index = ctx.actors[target].index;
                ctx.log
                    .push(BattleEffect::on(EffectKind::Heal, target_index).with_value(applied));
            }
            SpellKind::Status => {
                if let Some(status) = spell.status {
                    if ctx.actors[target].is_alive() {
                        try_inflict(ctx, pos, target, status, spell.power);
                    }
                }
            }
        }
    }
    ctx.log.close();
}

fn breathe(ctx: &mut BattleContext, pos: usize) {
    let index = ctx.actors[pos].index;
    let targets = ctx.living(ctx.actors[pos].side.opponent());
    if targets.is_empty() {
        return;
    }
    ctx.log.declare(BattleActionEntry::declare(
        ctx.turn,
        Some(index),
        ActionKind::Breath,
    ));
    for target in targets {
        if ctx.actors[target].is_alive() {
            strike(ctx, pos, target, &Strike::breath());
        }
    }
    ctx.log.close();
}

fn special_attack(ctx: &mut BattleContext, pos: usize, id: SpecialAttackId) {
    let Some(special) = ctx.tables.specials.get(&id).cloned() else {
        return;
    };
    let (targets, covered) = if special.target_all {
        (ctx.living(ctx.actors[pos].side.opponent()), None)
    } else {
        match select::pick_target(ctx, pos, true) {
            Some(pick) => (vec![pick.target], pick.covered.map(|c| (pick.target, c))),
            None => (Vec::new(), None),
        }
    };
    if targets.is_empty() {
        return;
    }

    let index = ctx.actors[pos].index;
    ctx.log.declare(
        BattleActionEntry::declare(ctx.turn, Some(index), ActionKind::SpecialAttack)
            .with_skill_index(u16::from(id.0)),
    );
    if let Some((coverer, covered)) = covered {
        push_cover(ctx, coverer, Some(covered));
    }
    let shape = Strike::special(special.damage_type, special.multiplier);
    for _ in 0..special.hits.max(1) {
        for target in &targets {
            if ctx.actors[*target].is_alive() && ctx.actors[pos].is_alive() {
                strike(ctx, pos, *target, &shape);
            }
        }
    }
    if let Some(status) = special.status {
        for target in &targets {
            if ctx.actors[*target].is_alive() {
                try_inflict(ctx, pos, *target, status, 100.0);
            }
        }
    }
    ctx.log.close();
}

/// Resolves one strike of the actor at `a` against the actor at `d` into the
/// open entry, and queues the reactions it triggers.
pub(crate) fn strike(ctx: &mut BattleContext, a: usize, d: usize, shape: &Strike) -> StrikeResult {
    let attacker_index = ctx.actors[a].index;
    let defender_index = ctx.actors[d].index;

    // accuracy
    if shape.evadable {
        let attacker = &ctx.actors[a];
        let defender = &ctx.actors[d];
        let floor = ctx.config.min_hit_percent
            * attacker.effects.combat.min_hit_scale.unwrap_or(1.0);
        let dodge_cap = defender
            .effects
            .combat
            .dodge_cap
            .unwrap_or(ctx.config.default_dodge_cap_percent);
        let chance = damage::hit_chance(
            attacker.stat(CombatStat::HitScore) * attacker.buff_factor(BuffKind::HitScore),
            defender.stat(CombatStat::EvasionScore) * defender.buff_factor(BuffKind::EvasionScore),
            floor,
            dodge_cap,
        );
        if !ctx.roll(attacker_index, RollContext::Hit, chance) {
            ctx.log.push(BattleEffect::on(EffectKind::Evade, defender_index));
            reaction::queue_reactions(
                ctx,
                d,
                attacker_index,
                ReactionTrigger::Evaded,
                Some(shape.damage_type),
                shape.depth,
            );
            return StrikeResult::Evaded;
        }
    }

    // parry and block
    let mut blocked = false;
    if shape.parryable {
        let parry = ctx.actors[d].effects.combat.parry_chance;
        if ctx.roll(defender_index, RollContext::Parry, parry) {
            ctx.log.push(BattleEffect::on(EffectKind::Parry, defender_index));
            return StrikeResult::Parried;
        }
        let block = ctx.actors[d].effects.combat.block_chance;
        blocked = ctx.roll(defender_index, RollContext::Block, block);
    }

    // critical
    let critical = shape.can_critical && {
        let attacker = &ctx.actors[a];
        let cap = attacker
            .effects
            .combat
            .critical_cap
            .unwrap_or(ctx.config.default_critical_cap_percent);
        let chance = damage::critical_chance(attacker.stat(CombatStat::CriticalChance), cap);
        ctx.roll(attacker_index, RollContext::Critical, chance)
    };

    // damage
    let variance = ctx.variance(attacker_index);
    let attacker = &ctx.actors[a];
    let defender = &ctx.actors[d];
    let kind = shape.damage_type;
    let base = damage::base_damage(
        attacker.attack_stat(kind) * shape.power,
        variance,
        defender.defense_stat(kind),
        attacker.effects.damage.penetration_percent,
    );
    let martial = kind == DamageType::Physical && attacker.martial;
    let factors = DamageFactors {
        dealt: attacker.effects.damage.dealt[kind].value(),
        taken: defender.effects.damage.taken[kind].value(),
        critical: if critical {
            ctx.config.critical_multiplier
                * attacker.effects.damage.critical.value()
                * defender.effects.damage.critical_taken.value()
        } else {
            1.0
        },
        martial: if martial {
            attacker.effects.damage.martial.value()
        } else {
            1.0
        },
        row: if kind == DamageType::Physical {
            attacker
                .effects
                .misc
                .row_profile
                .unwrap_or(RowProfile::Melee)
                .attack_multiplier(attacker.row)
        } else {
            1.0
        },
        hp_threshold: attacker
            .effects
            .damage
            .threshold_multiplier(defender.hp_percent()),
        level: defender
            .effects
            .damage
            .level_reduction(i32::from(defender.level) - i32::from(attacker.level)),
        buffs: attacker.buff_factor(BuffKind::DamageDealt)
            * defender.buff_factor(BuffKind::DamageTaken),
        ratio: shape.ratio,
    };
    let amount = damage::final_damage(base, &factors);

    let mut flags = DamageFlags::empty();
    flags.set(DamageFlags::CRITICAL, critical);
    flags.set(DamageFlags::MARTIAL, martial);
    let defender = &mut ctx.actors[d];
    let barrier_charge = defender.barrier_charges[kind] > 0;
    if barrier_charge {
        defender.barrier_charges[kind] -= 1;
    }
    flags.set(DamageFlags::BARRIER, barrier_charge);
    flags.set(DamageFlags::BLOCKED, blocked);
    let amount = damage::landed_damage(amount, barrier_charge, blocked);

    // HP
    defender.hp = defender.hp.saturating_sub(amount);
    if critical && kind == DamageType::Physical {
        defender.degradation = (defender.degradation + 1).min(BattleConfig::MAX_DEGRADATION);
    }
    let killed = defender.hp == 0;
    ctx.log.push(
        BattleEffect::on(damage_effect(kind), defender_index)
            .with_value(amount)
            .with_extra(flags.bits()),
    );

    // absorption
    let absorption = ctx.actors[a].effects.misc.absorption_percent;
    if absorption > 0.0 && ctx.actors[a].is_alive() {
        let applied = ctx.actors[a].heal((f64::from(amount) * absorption / 100.0) as u32);
        if applied > 0 {
            ctx.log
                .push(BattleEffect::on(EffectKind::Absorb, attacker_index).with_value(applied));
        }
    }

    // death
    if killed {
        ctx.actors[d].fall();
        ctx.log.record_kill(ctx.turn, Some(attacker_index), defender_index);
        ctx.pending.push_back(Pending::Rescue {
            fallen: defender_index,
        });
        reaction::queue_ally_reactions(
            ctx,
            d,
            attacker_index,
            ReactionTrigger::AllyDefeated,
            shape.depth,
        );
        return StrikeResult::Landed { killed: true };
    }

    reaction::queue_reactions(
        ctx,
        d,
        attacker_index,
        ReactionTrigger::Damaged,
        Some(kind),
        shape.depth,
    );

    if shape.inflicts {
        let inflictions = ctx.actors[a].effects.status.inflictions.clone();
        for infliction in inflictions {
            try_inflict(ctx, a, d, infliction.status, infliction.chance);
        }
    }

    StrikeResult::Landed { killed: false }
}

/// Rolls `status` from the actor at `a` onto the actor at `d` and logs the result.
///
/// The attacker's proc rate scales `chance`; the target's immunity and
/// susceptibility decide what is left. A status already present is refreshed.
pub(crate) fn try_inflict(
    ctx: &mut BattleContext,
    a: usize,
    d: usize,
    status: StatusId,
    chance: f64,
) {
    let attacker_index = ctx.actors[a].index;
    let target_index = ctx.actors[d].index;
    let chance = ctx.actors[a].effects.combat.proc_chance(chance);
    let landing = ctx.actors[d].effects.status.landing_chance(status, chance);
    let turns = ctx
        .tables
        .statuses
        .get(&status)
        .map_or(1, |def| def.turns.max(1));

    let landed = ctx.roll(attacker_index, RollContext::Status, landing) && {
        let target = &mut ctx.actors[d];
        if let Some(active) = target.statuses.iter_mut().find(|s| s.id == status) {
            active.remaining = active.remaining.max(turns);
            true
        } else {
            target
                .statuses
                .try_push(ActiveStatus {
                    id: status,
                    remaining: turns,
                })
                .is_ok()
        }
    };
    let kind = if landed {
        EffectKind::StatusInflicted
    } else {
        EffectKind::StatusResisted
    };
    ctx.log
        .push(BattleEffect::on(kind, target_index).with_status(status));
}
