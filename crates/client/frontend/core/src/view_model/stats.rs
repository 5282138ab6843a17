//! Read-only panels: stats overview, battle history, leaderboards, connection.
use battle_protocol::{
    CharacterStats, DamageEntry, GameRecord, OverallStats, PlayerStanding, ReplayEvent,
    RoundsEntry,
};

/// Push channel health as shown in the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionView {
    #[default]
    Connecting,
    Online,
    Reconnecting {
        attempt: u32,
    },
    /// Push gave up; stats are polled over HTTP.
    Polling,
}

impl ConnectionView {
    pub fn label(&self) -> String {
        match self {
            ConnectionView::Connecting => "connecting".to_string(),
            ConnectionView::Online => "online".to_string(),
            ConnectionView::Reconnecting { attempt } => format!("reconnecting ({attempt})"),
            ConnectionView::Polling => "polling".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StatsView {
    pub overview: Option<OverallStats>,
    pub characters: Option<CharacterStats>,
}

/// Recently finished battles; the first entry is the newest.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct HistoryView {
    pub recent: Vec<GameRecord>,
    /// Index into `recent` of the highlighted battle.
    pub selected: usize,
    /// Replay of the highlighted battle, once loaded.
    pub replay: Option<Replay>,
}

#[derive(Clone, Debug)]
pub struct Replay {
    pub game: GameRecord,
    pub events: Vec<ReplayEvent>,
}

impl HistoryView {
    pub fn selected_game(&self) -> Option<&GameRecord> {
        self.recent.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.recent.is_empty() {
            self.selected = (self.selected + 1) % self.recent.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.recent.is_empty() {
            self.selected = (self.selected + self.recent.len() - 1) % self.recent.len();
        }
    }

    /// Replaces the list, keeping the selection in range.
    pub fn set_recent(&mut self, games: Vec<GameRecord>) {
        self.recent = games;
        self.recent.truncate(HISTORY_LIMIT);
        self.clamp_selection();
    }

    /// Adds a just-finished battle on top, replacing an older copy.
    pub fn record_finished(&mut self, game: GameRecord) {
        self.recent.retain(|existing| existing.game_id != game.game_id);
        self.recent.insert(0, game);
        self.recent.truncate(HISTORY_LIMIT);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.recent.len() {
            self.selected = self.recent.len().saturating_sub(1);
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LeaderboardView {
    pub damage: Vec<DamageEntry>,
    pub rounds: Vec<RoundsEntry>,
    pub players: Vec<PlayerStanding>,
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_protocol::GameId;

    fn game(id: u64) -> GameRecord {
        GameRecord {
            game_id: GameId(id),
            timestamp: String::new(),
            total_rounds: 1,
            winner: None,
            player_name: "p".to_string(),
            dragon_stats: Default::default(),
            person_stats: Default::default(),
        }
    }

    #[test]
    fn finished_game_moves_to_top_without_duplicates() {
        let mut history = HistoryView::default();
        history.set_recent(vec![game(1), game(2)]);
        history.record_finished(game(2));
        let ids: Vec<_> = history.recent.iter().map(|g| g.game_id.0).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn selection_wraps_and_clamps() {
        let mut history = HistoryView::default();
        history.set_recent(vec![game(1), game(2), game(3)]);
        history.select_prev();
        assert_eq!(history.selected, 2);
        history.set_recent(vec![game(9)]);
        assert_eq!(history.selected, 0);
    }
}
