//! Text formatting shared by every frontend.
//!
//! Battle messages, stats summaries, leaderboard rows and replay lines. All
//! functions are pure so they can be unit tested without a terminal.

use battle_protocol::{
    DamageEntry, EffectKind, GameRecord, PlayerStanding, ReplayEvent, RoundsEntry, Side, SkillId,
    Winner,
};

/// Formats one landed effect.
///
/// Examples:
/// - "Hero hits Dragon King for 12 (critical!)"
/// - "Hero recovers 6 HP"
pub fn effect_message(target: Side, kind: EffectKind, value: u32, critical: bool) -> String {
    match kind {
        EffectKind::Damage => {
            let suffix = if critical { " (critical!)" } else { "" };
            format!(
                "{} hits {} for {}{}",
                target.opposite().title(),
                target.title(),
                value,
                suffix
            )
        }
        EffectKind::Heal => format!("{} recovers {} HP", target.title(), value),
    }
}

/// Floating marker text: "-12" / "+6".
pub fn floating_delta(kind: EffectKind, value: u32) -> String {
    match kind {
        EffectKind::Damage => format!("-{value}"),
        EffectKind::Heal => format!("+{value}"),
    }
}

pub fn winner_banner(winner: Option<Winner>) -> String {
    match winner {
        Some(Winner::Dragon) => "Dragon King wins!".to_string(),
        Some(Winner::Person) => "Hero wins!".to_string(),
        Some(Winner::Draw) => "Draw!".to_string(),
        None => "Battle over".to_string(),
    }
}

/// Short label used in tables: "dragon", "hero", "draw", "-".
pub fn winner_label(winner: Option<Winner>) -> &'static str {
    match winner {
        Some(Winner::Dragon) => "dragon",
        Some(Winner::Person) => "hero",
        Some(Winner::Draw) => "draw",
        None => "-",
    }
}

/// Skill button caption, with a cooldown badge while not ready.
pub fn skill_caption(skill: SkillId, remaining: u32) -> String {
    if remaining == 0 {
        format!("[{}] {}", skill, skill.label())
    } else {
        format!("[{}] {} ({})", skill, skill.label(), remaining)
    }
}

/// Win rate as shown in stats panels. The backend reports percentages.
pub fn win_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

/// Win rate computed locally from counts.
pub fn ratio(wins: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    win_rate(wins as f64 * 100.0 / total as f64)
}

pub fn game_row(record: &GameRecord) -> String {
    format!(
        "{:<6} {:<20} {:>3} rounds  winner: {}",
        record.game_id,
        record.player_name,
        record.total_rounds,
        winner_label(record.winner)
    )
}

pub fn damage_row(rank: usize, entry: &DamageEntry) -> String {
    format!(
        "{:>2}. #{:<5} {:<20} {:>5} dmg",
        rank, entry.game_id, entry.player_name, entry.damage
    )
}

pub fn rounds_row(rank: usize, entry: &RoundsEntry) -> String {
    format!(
        "{:>2}. #{:<5} {:<20} {:>5} rounds",
        rank, entry.game_id, entry.player_name, entry.rounds
    )
}

pub fn player_row(rank: usize, standing: &PlayerStanding) -> String {
    format!(
        "{:>2}. {:<20} {:>4} wins / {:<4} {:>7}",
        rank,
        standing.player_name,
        standing.wins,
        standing.total,
        win_rate(standing.win_rate)
    )
}

/// One line of a battle replay.
///
/// Examples:
/// - "T3  dragon  attack 7  (critical)"
/// - "--  system  battle started"
pub fn replay_line(event: &ReplayEvent) -> String {
    let turn = event
        .turn
        .map_or_else(|| "--".to_string(), |turn| format!("T{turn}"));
    let actor = event.actor.as_deref().map_or("system", actor_label);

    let mut line = format!("{turn:<4}{actor:<8}");
    if let Some(action) = event.action.as_deref() {
        line.push_str(action);
    }
    if let Some(value) = event.value.as_deref().filter(|value| !value.is_empty()) {
        line.push(' ');
        line.push_str(value);
    }
    if let Some(details) = event.details.as_deref().filter(|details| !details.is_empty()) {
        line.push_str(&format!("  ({details})"));
    }
    line
}

fn actor_label(raw: &str) -> &str {
    match raw {
        "龍王" | "dragon" => "dragon",
        "勇者" | "person" => "hero",
        other => other,
    }
}
