//! Deterministic randomness for battle resolution.
//!
//! [`PcgRng`] is a stateless mixer: the same seed always yields the same
//! value. [`BattleRng`] layers a per-battle seed and a monotonically
//! increasing nonce on top, so every roll in a battle gets its own seed and
//! replaying the same battle seed reproduces every roll in order.
//!
//! Nothing here reads a clock or an OS entropy source.

use crate::types::ActorIndex;

/// RNG oracle for deterministic random number generation.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the battle seed, the roll sequence number, the acting combatant and
/// the roll purpose into one seed.
pub fn compute_seed(battle_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = battle_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Purpose of a roll. Mixed into the seed so that two rolls made for
/// different reasons never share a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RollContext {
    ActionOrder = 0,
    Shuffle = 1,
    SpecialAttack = 2,
    ActionChoice = 3,
    Target = 4,
    Hit = 5,
    Critical = 6,
    Variance = 7,
    Parry = 8,
    Block = 9,
    Status = 10,
    Reaction = 11,
    ExtraAction = 12,
    Resurrection = 13,
    Runaway = 14,
    Repair = 15,
    ChargeRecovery = 16,
}

/// Per-battle random stream.
#[derive(Clone, Debug)]
pub struct BattleRng {
    seed: u64,
    nonce: u64,
    source: PcgRng,
}

impl BattleRng {
    /// Resolution of fractional-percent chance rolls.
    const CHANCE_SCALE: u32 = 10_000;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            source: PcgRng,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rolls consumed so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn next_u32(&mut self, actor: ActorIndex, context: RollContext) -> u32 {
        let seed = compute_seed(self.seed, self.nonce, u32::from(actor.0), context as u32);
        self.nonce += 1;
        self.source.next_u32(seed)
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self, actor: ActorIndex, context: RollContext) -> f64 {
        f64::from(self.next_u32(actor, context)) / (f64::from(u32::MAX) + 1.0)
    }

    /// Succeeds with probability `percent / 100`.
    ///
    /// Certain outcomes (`<= 0` or `>= 100`) do not consume a roll.
    pub fn chance(&mut self, actor: ActorIndex, context: RollContext, percent: f64) -> bool {
        if percent <= 0.0 {
            return false;
        }
        if percent >= 100.0 {
            return true;
        }
        let threshold = (percent * 100.0) as u32;
        self.next_u32(actor, context) % Self::CHANCE_SCALE < threshold
    }

    /// Index picked with probability proportional to its weight. Non-positive
    /// weights are never picked; `None` when nothing is pickable.
    pub fn pick_weighted(
        &mut self,
        actor: ActorIndex,
        context: RollContext,
        weights: &[f64],
    ) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let candidates = weights.iter().filter(|w| **w > 0.0).count();
        if candidates == 1 {
            return weights.iter().position(|w| *w > 0.0);
        }
        let mut point = self.unit(actor, context) * total;
        let mut last = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if point < *weight {
                return Some(index);
            }
            point -= *weight;
            last = Some(index);
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR: ActorIndex = ActorIndex(1);

    #[test]
    fn same_seed_same_stream() {
        let mut a = BattleRng::new(42);
        let mut b = BattleRng::new(42);
        for _ in 0..32 {
            assert_eq!(
                a.next_u32(ACTOR, RollContext::Hit),
                b.next_u32(ACTOR, RollContext::Hit)
            );
        }
        assert_eq!(a.nonce(), 32);
    }

    #[test]
    fn certain_chances_do_not_consume_rolls() {
        let mut rng = BattleRng::new(7);
        assert!(rng.chance(ACTOR, RollContext::Resurrection, 100.0));
        assert!(!rng.chance(ACTOR, RollContext::Resurrection, 0.0));
        assert_eq!(rng.nonce(), 0);
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = BattleRng::new(3);
        for _ in 0..64 {
            let picked = rng.pick_weighted(ACTOR, RollContext::Target, &[0.0, 2.0, 0.0, 1.0]);
            assert!(matches!(picked, Some(1) | Some(3)));
        }
        assert_eq!(rng.pick_weighted(ACTOR, RollContext::Target, &[0.0, 0.0]), None);
    }

    #[test]
    fn unit_stays_below_one() {
        let mut rng = BattleRng::new(99);
        for _ in 0..256 {
            let value = rng.unit(ACTOR, RollContext::Variance);
            assert!((0.0..1.0).contains(&value));
        }
    }
}
