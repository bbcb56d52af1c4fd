//! Utility functions for xtask commands

use std::collections::BTreeMap;

use anyhow::Result;
use console::style;

use battle_core::{
    ActorIndex, BattleActionEntry, BattleEffect, BattleLog, Participants, reconstruct_hp,
};

/// Data directory used when `--data-dir` is not given.
pub const DEFAULT_DATA_DIR: &str = "crates/battle/content/data";

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Summary view (outcome, counts and final HP)
    Summary,
    /// List every entry
    List,
    /// Full JSON output
    Json,
}

/// `player 4`, `enemy 2 B`, or the raw index for unknown actors.
pub fn actor_name(participants: &Participants, actor: ActorIndex) -> String {
    if let Some(player) = participants.players.iter().find(|p| p.actor == actor) {
        return format!("player {}", player.master_id);
    }
    if let Some(enemy) = participants.enemies.iter().find(|p| p.actor == actor) {
        return if enemy.label.is_empty() {
            format!("enemy {}", enemy.master_id)
        } else {
            format!("enemy {} {}", enemy.master_id, enemy.label)
        };
    }
    format!("#{}", actor.0)
}

pub fn describe_entry(participants: &Participants, entry: &BattleActionEntry) -> String {
    let mut line = format!("T{:<3} {}", entry.turn, style(entry.kind).bold());
    if let Some(actor) = entry.actor {
        line.push_str(&format!(" by {}", actor_name(participants, actor)));
    }
    if let Some(skill) = entry.skill_index {
        line.push_str(&format!(" [{}]", skill));
    }
    for effect in &entry.effects {
        line.push_str("\n       ");
        line.push_str(&describe_effect(participants, effect));
    }
    line
}

fn describe_effect(participants: &Participants, effect: &BattleEffect) -> String {
    let mut line = effect.kind.to_string();
    if let Some(target) = effect.target {
        line.push_str(&format!(" -> {}", actor_name(participants, target)));
    }
    if let Some(value) = effect.value {
        line.push_str(&format!(" {}", style(value).yellow()));
    }
    if let Some(status) = effect.status_id {
        line.push_str(&format!(" ({})", status));
    }
    if effect.kind.is_damage() {
        let flags = effect.damage_flags();
        if !flags.is_empty() {
            let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
            line.push_str(&format!(" {}", style(names.join("|")).dim()));
        }
    } else if let Some(extra) = effect.extra {
        line.push_str(&format!(" extra={}", extra));
    }
    line
}

pub fn print_entries(log: &BattleLog) {
    for entry in &log.entries {
        println!("{}", describe_entry(&log.participants, entry));
    }
}

pub fn print_summary(log: &BattleLog) -> Result<()> {
    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for entry in &log.entries {
        *kinds.entry(entry.kind.to_string()).or_default() += 1;
    }

    println!("{} {:?}", style("Outcome:").bold().cyan(), log.outcome);
    println!("{} {}", style("Turns:").bold().cyan(), log.turns);
    println!("{} {}", style("Entries:").bold().cyan(), log.entries.len());
    println!(
        "{} {}",
        style("Digest:").bold().cyan(),
        hex::encode(log.digest()?)
    );
    println!();

    println!("{}", style("Entries by kind:").bold());
    for (kind, count) in &kinds {
        println!("  {:<24} {}", kind, count);
    }
    println!();

    let timeline = reconstruct_hp(log);
    println!("{}", style("Final HP:").bold());
    for (actor, hp) in &timeline.final_hp {
        let initial = log.initial_hp.get(actor).copied().unwrap_or(0);
        let line = format!(
            "  {:<16} {:>6} / {}",
            actor_name(&log.participants, *actor),
            hp,
            initial
        );
        if *hp == 0 {
            println!("{}", style(line).red());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

pub fn print_json(log: &BattleLog) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(log)?);
    Ok(())
}

