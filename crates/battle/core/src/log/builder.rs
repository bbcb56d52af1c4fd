use std::collections::BTreeMap;

use crate::types::ActorIndex;

use super::error::LogInvariantViolation;
use super::kind::{ActionKind, EffectKind};
use super::model::{
    BattleActionEntry, BattleEffect, BattleLog, BattleOutcome, LOG_VERSION, Participants,
};

/// Append-only writer used by the engine while a battle runs.
///
/// At most one entry is open at a time; effects always go to the open entry.
/// Contract breaches panic in development builds and are collected as
/// diagnostics otherwise, with the offending effect still recorded.
#[derive(Clone, Debug, Default)]
pub struct LogBuilder {
    initial_hp: BTreeMap<ActorIndex, u32>,
    entries: Vec<BattleActionEntry>,
    open: bool,
    violations: Vec<LogInvariantViolation>,
}

impl LogBuilder {
    pub fn new(initial_hp: BTreeMap<ActorIndex, u32>) -> Self {
        Self {
            initial_hp,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn entries(&self) -> &[BattleActionEntry] {
        &self.entries
    }

    /// Entries appended since `start`, for streaming per-step output.
    pub fn entries_since(&self, start: usize) -> &[BattleActionEntry] {
        self.entries.get(start..).unwrap_or(&[])
    }

    /// Opens `entry`. An entry still open is closed first and reported.
    pub fn declare(&mut self, entry: BattleActionEntry) {
        if self.open {
            let violation = LogInvariantViolation::EntryLeftOpen {
                turn: entry.turn,
                action: entry.kind,
            };
            self.report(violation);
        }
        self.entries.push(entry);
        self.open = true;
    }

    /// Appends a declaration that carries no effects and closes it.
    pub fn announce(&mut self, turn: u16, actor: Option<ActorIndex>, kind: ActionKind) {
        self.declare(BattleActionEntry::declare(turn, actor, kind));
        self.close();
    }

    /// Appends a declaration with its single marker effect and closes it.
    pub fn announce_with_marker(&mut self, entry: BattleActionEntry) {
        self.declare(entry);
        self.push(BattleEffect::marker());
        self.close();
    }

    /// Appends `effect` to the open entry.
    pub fn push(&mut self, effect: BattleEffect) {
        if !self.open {
            let turn = self.entries.last().map_or(0, |entry| entry.turn);
            self.report(LogInvariantViolation::EffectWithoutEntry {
                turn,
                effect: effect.kind,
            });
        }
        let Some(entry) = self.entries.last_mut() else {
            return;
        };
        let (turn, action) = (entry.turn, entry.kind);
        let extra_marker = effect.kind == EffectKind::Marker
            && entry.effects.iter().any(|e| e.kind == EffectKind::Marker);
        entry.effects.push(effect.clone());

        if !action.permits(effect.kind) {
            self.report(LogInvariantViolation::IllegalEffect {
                turn,
                action,
                effect: effect.kind,
            });
        } else if extra_marker {
            self.report(LogInvariantViolation::ExtraMarker { turn, action });
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Records that `target` died.
    ///
    /// The death joins the open entry when there is one; otherwise it gets a
    /// standalone [`ActionKind::PhysicalKill`] entry attributed to `killer`.
    pub fn record_kill(&mut self, turn: u16, killer: Option<ActorIndex>, target: ActorIndex) {
        let defeated = BattleEffect::on(EffectKind::Defeated, target);
        if self.open {
            self.push(defeated);
            return;
        }
        self.declare(BattleActionEntry::declare(
            turn,
            killer,
            ActionKind::PhysicalKill,
        ));
        self.push(defeated);
        self.close();
    }

    /// Closes the log for good.
    pub fn seal(
        mut self,
        outcome: BattleOutcome,
        turns: u16,
        participants: Participants,
    ) -> (BattleLog, Vec<LogInvariantViolation>) {
        self.close();
        let log = BattleLog {
            version: LOG_VERSION,
            initial_hp: self.initial_hp,
            entries: self.entries,
            outcome,
            turns,
            participants,
        };
        (log, self.violations)
    }

    fn report(&mut self, violation: LogInvariantViolation) {
        if cfg!(debug_assertions) {
            panic!("battle log invariant violated: {violation}");
        }
        self.violations.push(violation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> LogBuilder {
        let mut hp = BTreeMap::new();
        hp.insert(ActorIndex(1), 50);
        hp.insert(ActorIndex(1001), 40);
        LogBuilder::new(hp)
    }

    #[test]
    fn multi_target_action_stays_one_entry() {
        let mut log = builder();
        log.declare(BattleActionEntry::declare(
            1,
            Some(ActorIndex(1)),
            ActionKind::SpellCast,
        ));
        for target in [ActorIndex(1001), ActorIndex(2001)] {
            log.push(BattleEffect::on(EffectKind::MagicalDamage, target).with_value(9));
        }
        log.close();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].effects.len(), 2);
    }

    #[test]
    fn kill_without_open_entry_gets_its_own_entry() {
        let mut log = builder();
        log.record_kill(3, Some(ActorIndex(1)), ActorIndex(1001));
        let (sealed, violations) = log.seal(BattleOutcome::Victory, 3, Participants::default());
        assert!(violations.is_empty());
        let entry = &sealed.entries[0];
        assert_eq!(entry.kind, ActionKind::PhysicalKill);
        assert_eq!(entry.actor, Some(ActorIndex(1)));
        assert_eq!(
            entry.effects,
            vec![BattleEffect::on(EffectKind::Defeated, ActorIndex(1001))]
        );
    }

    #[test]
    fn kill_joins_the_open_entry() {
        let mut log = builder();
        log.declare(BattleActionEntry::declare(
            2,
            Some(ActorIndex(1)),
            ActionKind::PhysicalAttack,
        ));
        log.push(BattleEffect::on(EffectKind::PhysicalDamage, ActorIndex(1001)).with_value(40));
        log.record_kill(2, Some(ActorIndex(1)), ActorIndex(1001));
        log.close();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].effects[1].kind, EffectKind::Defeated);
    }

    #[test]
    fn seal_keeps_initial_hp_and_version() {
        let mut log = builder();
        log.announce_with_marker(BattleActionEntry::declare(0, None, ActionKind::BattleStart));
        let (sealed, _) = log.seal(BattleOutcome::Defeat, 0, Participants::default());
        assert_eq!(sealed.version, LOG_VERSION);
        assert_eq!(sealed.initial_hp.len(), 2);
        assert_eq!(sealed.entries[0].effects, vec![BattleEffect::marker()]);
    }

    #[test]
    fn entries_since_returns_the_tail() {
        let mut log = builder();
        log.announce(1, None, ActionKind::TurnStart);
        let mark = log.len();
        log.announce(2, None, ActionKind::TurnStart);
        assert_eq!(log.entries_since(mark).len(), 1);
        assert!(log.entries_since(10).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not a legal effect")]
    fn illegal_effect_panics_in_debug() {
        let mut log = builder();
        log.declare(BattleActionEntry::declare(
            1,
            Some(ActorIndex(1)),
            ActionKind::SpellCast,
        ));
        log.push(BattleEffect::on(EffectKind::Evade, ActorIndex(1001)));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn illegal_effect_is_kept_and_reported_in_release() {
        let mut log = builder();
        log.declare(BattleActionEntry::declare(
            1,
            Some(ActorIndex(1)),
            ActionKind::SpellCast,
        ));
        log.push(BattleEffect::on(EffectKind::Evade, ActorIndex(1001)));
        let (sealed, violations) = log.seal(BattleOutcome::Victory, 1, Participants::default());
        assert_eq!(sealed.entries[0].effects.len(), 1);
        assert!(matches!(
            violations.as_slice(),
            [LogInvariantViolation::IllegalEffect { .. }]
        ));
    }
}
