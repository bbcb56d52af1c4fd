/// Random source behaviour for damage variance.
///
/// `FixedMedian` pins every damage-variance roll to its median so damage
/// formulas can be checked by hand. Chance rolls (hit, critical, procs) keep
/// using the seeded stream in both modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RandomMode {
    #[default]
    Seeded,
    FixedMedian,
}

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Turn after which an unresolved battle ends in a retreat.
    pub turn_limit: u16,
    /// Maximum length of a reaction chain (counter → follow-up → …).
    pub max_reaction_depth: u8,
    pub random_mode: RandomMode,
    /// Floor of the hit chance before `minHitScale` is applied.
    pub min_hit_percent: f64,
    /// Evasion cap used when the defender carries no `dodgeCap` effect.
    pub default_dodge_cap_percent: f64,
    /// Base critical damage multiplier before skill modifiers.
    pub critical_multiplier: f64,
    /// Critical chance cap used when the attacker carries no `criticalRateMax` effect.
    pub default_critical_cap_percent: f64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum simultaneous status effects on one actor.
    pub const MAX_STATUS_EFFECTS: usize = 8;
    /// Maximum actors per side.
    pub const MAX_SIDE_ACTORS: usize = 12;
    /// Degradation steps an actor can accumulate.
    pub const MAX_DEGRADATION: u8 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_LIMIT: u16 = 20;
    pub const DEFAULT_MAX_REACTION_DEPTH: u8 = 3;

    pub fn new() -> Self {
        Self {
            turn_limit: Self::DEFAULT_TURN_LIMIT,
            max_reaction_depth: Self::DEFAULT_MAX_REACTION_DEPTH,
            random_mode: RandomMode::Seeded,
            min_hit_percent: 5.0,
            default_dodge_cap_percent: 95.0,
            critical_multiplier: 1.5,
            default_critical_cap_percent: 100.0,
        }
    }

    pub fn with_random_mode(mut self, random_mode: RandomMode) -> Self {
        self.random_mode = random_mode;
        self
    }

    pub fn with_turn_limit(mut self, turn_limit: u16) -> Self {
        self.turn_limit = turn_limit;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
