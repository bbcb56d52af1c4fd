use crate::env::RollContext;
use crate::types::{ActorIndex, Attribute};

use super::context::BattleContext;

/// Acting order for one turn.
///
/// Speed is agility × `actionOrderMultiplier` × a `[0.9, 1.1)` roll. Actors
/// with `actionOrderShuffle` replace their speed by a uniform roll over the
/// fastest speed on the field. `firstStrike` actors always go first. Ties
/// resolve by actor index.
pub(crate) fn action_order(ctx: &mut BattleContext) -> Vec<ActorIndex> {
    let living: Vec<usize> = (0..ctx.actors.len())
        .filter(|pos| ctx.actors[*pos].is_alive())
        .collect();

    let mut speeds: Vec<(usize, f64)> = Vec::with_capacity(living.len());
    for pos in living {
        let actor = &ctx.actors[pos];
        let index = actor.index;
        let agility = actor.snapshot.attribute(Attribute::Agility).max(1) as f64;
        let multiplier = actor.effects.combat.action_order.value();
        let roll = 0.9 + 0.2 * ctx.rng.unit(index, RollContext::ActionOrder);
        speeds.push((pos, agility * multiplier * roll));
    }

    let fastest = speeds.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    for (pos, speed) in &mut speeds {
        if ctx.actors[*pos].effects.combat.shuffle_order {
            let index = ctx.actors[*pos].index;
            *speed = fastest * ctx.rng.unit(index, RollContext::Shuffle);
        }
    }

    speeds.sort_by(|(a, speed_a), (b, speed_b)| {
        let first_a = ctx.actors[*a].effects.combat.first_strike;
        let first_b = ctx.actors[*b].effects.combat.first_strike;
        first_b
            .cmp(&first_a)
            .then_with(|| speed_b.total_cmp(speed_a))
            .then_with(|| ctx.actors[*a].index.cmp(&ctx.actors[*b].index))
    });

    speeds
        .into_iter()
        .map(|(pos, _)| ctx.actors[pos].index)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};

    use super::*;
    use crate::config::BattleConfig;
    use crate::engine::actor::{BattleActor, BattleActorSeed};
    use crate::engine::context::BattleTables;
    use crate::env::BattleRng;
    use crate::log::LogBuilder;
    use crate::stats::CombatSnapshot;
    use crate::types::Side;

    fn seed(index: u16, agility: i64) -> BattleActorSeed {
        let mut snapshot = CombatSnapshot::default();
        snapshot.attributes[Attribute::Agility] = agility;
        BattleActorSeed::new(ActorIndex(index), Side::Player, snapshot)
    }

    fn context(seeds: Vec<BattleActorSeed>, battle_seed: u64) -> BattleContext {
        BattleContext {
            config: BattleConfig::new(),
            tables: BattleTables::default(),
            actors: seeds
                .into_iter()
                .map(|seed| BattleActor::from_seed(seed, BTreeMap::new()))
                .collect(),
            rng: BattleRng::new(battle_seed),
            log: LogBuilder::new(BTreeMap::new()),
            turn: 1,
            pending: VecDeque::new(),
        }
    }

    #[test]
    fn faster_actors_go_first_and_first_strike_beats_speed() {
        let mut slow = seed(3, 1);
        slow.effects.combat.first_strike = true;
        let mut ctx = context(vec![seed(1, 100), seed(2, 10), slow], 5);

        let order = action_order(&mut ctx);

        assert_eq!(order, vec![ActorIndex(3), ActorIndex(1), ActorIndex(2)]);
    }

    #[test]
    fn shuffled_order_replays_from_the_same_seed() {
        let roster = || {
            (1..=6)
                .map(|index| {
                    let mut actor = seed(index, 10);
                    actor.effects.combat.shuffle_order = index % 2 == 0;
                    actor
                })
                .collect::<Vec<_>>()
        };
        let mut first = context(roster(), 77);
        let mut second = context(roster(), 77);

        let order = action_order(&mut first);
        assert_eq!(order, action_order(&mut second));
        assert_eq!(first.rng.nonce(), 9);

        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(sorted, (1..=6).map(ActorIndex).collect::<Vec<_>>());
    }
}
