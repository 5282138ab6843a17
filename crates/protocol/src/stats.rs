//! Read-only aggregate and history payloads.
//!
//! These back the stats, history and leaderboard panels. Many numeric fields
//! originate as Redis strings, so decoding is lenient.
use serde::{Deserialize, Serialize};

use crate::de::{lenient_winner, number_or_string, optional_number};
use crate::ids::{GameId, Side, Winner};

/// `GET /stats`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallStats {
    pub total_games: u64,
    pub dragon_wins: u64,
    pub person_wins: u64,
    pub draws: u64,
    pub avg_rounds: f64,
    pub dragon_win_rate: f64,
    pub person_win_rate: f64,
}

impl OverallStats {
    pub fn wins(&self, side: Side) -> u64 {
        match side {
            Side::Dragon => self.dragon_wins,
            Side::Person => self.person_wins,
        }
    }
}

/// Per-side aggregate inside [`CharacterStats`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideStats {
    pub total_damage: u64,
    pub total_healing: u64,
    pub total_crits: u64,
    pub avg_damage: f64,
    pub avg_healing: f64,
}

/// `GET /stats/characters`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStats {
    pub dragon: SideStats,
    pub person: SideStats,
}

impl CharacterStats {
    pub fn side(&self, side: Side) -> &SideStats {
        match side {
            Side::Dragon => &self.dragon,
            Side::Person => &self.person,
        }
    }
}

/// Per-fighter totals of one finished battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterRecord {
    #[serde(deserialize_with = "number_or_string")]
    pub total_damage_dealt: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub total_healing: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub critical_hits: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub final_hp: u64,
}

/// One finished battle, as listed by `/games/*` and announced by the
/// `game_finished` push.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, alias = "rounds", deserialize_with = "number_or_string")]
    pub total_rounds: u64,
    #[serde(default, deserialize_with = "lenient_winner")]
    pub winner: Option<Winner>,
    #[serde(default = "anonymous")]
    pub player_name: String,
    #[serde(default)]
    pub dragon_stats: FighterRecord,
    #[serde(default)]
    pub person_stats: FighterRecord,
}

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// One entry of `GET /games/{id}/replay`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayEvent {
    pub id: String,
    #[serde(deserialize_with = "optional_number")]
    pub turn: Option<u64>,
    pub actor: Option<String>,
    pub action: Option<String>,
    pub value: Option<String>,
    pub details: Option<String>,
}

/// `GET /leaderboard`: highest hero damage in a single battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEntry {
    #[serde(deserialize_with = "number_or_string")]
    pub game_id: u64,
    #[serde(default = "anonymous")]
    pub player_name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub damage: u64,
}

/// `GET /leaderboard/rounds`: longest battles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundsEntry {
    #[serde(deserialize_with = "number_or_string")]
    pub game_id: u64,
    #[serde(default = "anonymous")]
    pub player_name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub rounds: u64,
}

/// `GET /leaderboard/players`: wins per player name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_name: String,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub total_damage: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_record_tolerates_redis_strings() {
        let raw = r#"{
            "game_id": 31, "timestamp": "2025-01-01T10:00:00+08:00",
            "total_rounds": "14", "winner": "未定", "player_name": "Ari",
            "dragon_stats": {"total_damage_dealt": "40", "critical_hits": 2},
            "person_stats": {"total_damage_dealt": 52, "final_hp": "3"}
        }"#;

        let record: GameRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.total_rounds, 14);
        assert_eq!(record.winner, None);
        assert_eq!(record.dragon_stats.total_damage_dealt, 40);
        assert_eq!(record.person_stats.final_hp, 3);
    }

    #[test]
    fn leaderboard_ids_may_be_strings() {
        let raw = r#"[{"game_id": "9", "player_name": "Bo", "damage": 77.0}]"#;
        let entries: Vec<DamageEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries[0].game_id, 9);
        assert_eq!(entries[0].damage, 77);
    }

    #[test]
    fn empty_stats_object_decodes_to_zeroes() {
        let stats: OverallStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, OverallStats::default());
    }
}
