//! Combat stat calculator.
//!
//! Turns race, job, level, equipment and the compiled non-battle
//! [`StatModifierSet`](crate::skills::StatModifierSet) into a
//! [`CombatSnapshot`].
//!
//! ```text
//! base → additive → multiplicative → conversions → floors → fixed-to-one
//! ```
//!
//! All outputs are integers. Every intermediate product is truncated toward
//! zero (`as i64`) before the next stage consumes it; never rounded.

mod base;
mod calculator;

pub use calculator::{CombatSnapshot, StatInputs, base_attributes, calculate};
