use strum::IntoEnumIterator;

use crate::env::{RollContext, SpellKind, SpellTarget};
use crate::types::{ActionChoice, CombatStat, Row, SpecialAttackId, SpellId};

use super::context::BattleContext;

/// What an actor does with its action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionPlan {
    Attack,
    Spell(SpellId),
    Breath,
    Special(SpecialAttackId),
}

/// Weight a back-row target keeps while its side still has a front row.
const SHIELDED_ROW_WEIGHT: f64 = 0.5;

/// Picks the action of the actor at `pos`.
///
/// Special attacks roll first, in grant order. Otherwise the action families
/// are weighted by the actor's base rates plus its `actionRate` effects; a
/// family with nothing usable behind it is skipped, and an actor with no
/// usable weight attacks.
pub(crate) fn choose_action(ctx: &mut BattleContext, pos: usize) -> ActionPlan {
    let index = ctx.actors[pos].index;

    let grants = ctx.actors[pos].effects.combat.special_attacks.clone();
    for grant in grants {
        if !ctx.tables.specials.contains_key(&grant.id) {
            continue;
        }
        let chance = ctx.actors[pos].effects.combat.proc_chance(grant.chance);
        if ctx.roll(index, RollContext::SpecialAttack, chance) {
            return ActionPlan::Special(grant.id);
        }
    }

    let actor = &ctx.actors[pos];
    let bonus = &actor.effects.combat.action_rates;
    if actor.action_rates.is_empty() && bonus.is_empty() {
        return ActionPlan::Attack;
    }

    let spells = usable_spells(ctx, pos);
    let has_breath = ctx.actors[pos].stat(CombatStat::BreathDamage) > 0.0;
    let choices: Vec<ActionChoice> = ActionChoice::iter().collect();
    let weights: Vec<f64> = choices
        .iter()
        .map(|choice| {
            let actor = &ctx.actors[pos];
            let weight = actor.action_rates.get(choice).copied().unwrap_or(0.0)
                + actor
                    .effects
                    .combat
                    .action_rates
                    .get(choice)
                    .copied()
                    .unwrap_or(0.0);
            let usable = match choice {
                ActionChoice::Attack => true,
                ActionChoice::Spell => !spells.is_empty(),
                ActionChoice::Breath => has_breath,
            };
            if usable { weight } else { 0.0 }
        })
        .collect();

    match ctx
        .rng
        .pick_weighted(index, RollContext::ActionChoice, &weights)
        .map(|i| choices[i])
    {
        Some(ActionChoice::Spell) => {
            let even = vec![1.0; spells.len()];
            ctx.rng
                .pick_weighted(index, RollContext::ActionChoice, &even)
                .map_or(ActionPlan::Attack, |i| ActionPlan::Spell(spells[i]))
        }
        Some(ActionChoice::Breath) => ActionPlan::Breath,
        Some(ActionChoice::Attack) | None => ActionPlan::Attack,
    }
}

/// Known spells with a charge left whose casting would do something.
fn usable_spells(ctx: &BattleContext, pos: usize) -> Vec<SpellId> {
    let actor = &ctx.actors[pos];
    let silenced = actor.statuses.iter().any(|status| {
        ctx.tables
            .statuses
            .get(&status.id)
            .is_some_and(|def| def.prevents_spell)
    });
    if silenced {
        return Vec::new();
    }
    let injured_ally = ctx
        .living(actor.side)
        .into_iter()
        .any(|ally| ctx.actors[ally].hp < ctx.actors[ally].max_hp);

    actor
        .spells
        .iter()
        .copied()
        .filter(|id| actor.spell_charges.get(id).copied().unwrap_or(0) > 0)
        .filter(|id| {
            ctx.tables.spells.get(id).is_some_and(|spell| {
                spell.kind != SpellKind::Heal || (injured_ally && !spell.target.is_hostile())
            })
        })
        .collect()
}

/// A hostile target and, when a front-row ally stepped in, the actor it covered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TargetPick {
    pub target: usize,
    pub covered: Option<usize>,
}

/// Picks one hostile target for the actor at `pos`.
///
/// Candidates are living opponents, plus living unprotected allies when the
/// actor is party-hostile. Each weighs its own `targetingWeight`; back-row
/// candidates weigh half while their side has a living front row. When
/// `allow_cover` is set and a back-row target has a living front-row ally
/// with `coverRowsBehind`, that ally takes the hit.
pub(crate) fn pick_target(ctx: &mut BattleContext, pos: usize, allow_cover: bool) -> Option<TargetPick> {
    let attacker = &ctx.actors[pos];
    let index = attacker.index;
    let mut candidates = ctx.living(attacker.side.opponent());
    if attacker.effects.combat.party_hostile {
        candidates.extend(ctx.living(attacker.side).into_iter().filter(|ally| {
            *ally != pos && !ctx.actors[*ally].effects.combat.party_protect
        }));
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|c| {
            let candidate = &ctx.actors[*c];
            let shielded = candidate.row == Row::Back
                && ctx
                    .living(candidate.side)
                    .into_iter()
                    .any(|ally| ctx.actors[ally].row == Row::Front);
            let row = if shielded { SHIELDED_ROW_WEIGHT } else { 1.0 };
            candidate.effects.misc.targeting_weight.value() * row
        })
        .collect();

    let picked = candidates[ctx.rng.pick_weighted(index, RollContext::Target, &weights)?];
    if !allow_cover || ctx.actors[picked].row != Row::Back {
        return Some(TargetPick {
            target: picked,
            covered: None,
        });
    }

    let cover = ctx
        .living(ctx.actors[picked].side)
        .into_iter()
        .find(|ally| {
            *ally != picked
                && ctx.actors[*ally].row == Row::Front
                && ctx.actors[*ally].effects.misc.cover_rows_behind
        });
    Some(match cover {
        Some(coverer) => TargetPick {
            target: coverer,
            covered: Some(picked),
        },
        None => TargetPick {
            target: picked,
            covered: None,
        },
    })
}

/// Targets of a spell, before any of them is resolved.
pub(crate) fn spell_targets(ctx: &mut BattleContext, pos: usize, target: SpellTarget) -> Vec<usize> {
    let side = ctx.actors[pos].side;
    match target {
        SpellTarget::SingleEnemy => pick_target(ctx, pos, false)
            .map(|pick| vec![pick.target])
            .unwrap_or_default(),
        SpellTarget::AllEnemies => ctx.living(side.opponent()),
        SpellTarget::SingleAlly => ctx
            .living(side)
            .into_iter()
            .min_by(|a, b| {
                ctx.actors[*a]
                    .hp_percent()
                    .total_cmp(&ctx.actors[*b].hp_percent())
                    .then_with(|| a.cmp(b))
            })
            .into_iter()
            .collect(),
        SpellTarget::AllAllies => ctx.living(side),
    }
}
