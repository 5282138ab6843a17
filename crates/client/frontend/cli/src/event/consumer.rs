//! Maintains the CLI message log in response to runtime events.
use runtime::{ConnectionEvent, Event, PlaybackEvent, SessionEvent, StatsEvent};

use client_frontend_core::{
    AchievementSet, SessionHooks,
    event::{EventConsumer, EventImpact},
    format,
    message::{MessageEntry, MessageLevel, MessageLog},
};

pub struct CliEventConsumer {
    log: MessageLog,
    hooks: Box<dyn SessionHooks>,
    achievements: AchievementSet,
    /// Round the next playback messages belong to.
    round: Option<u32>,
}

impl CliEventConsumer {
    pub fn new(log: MessageLog, hooks: Box<dyn SessionHooks>) -> Self {
        Self {
            log,
            hooks,
            achievements: AchievementSet::default(),
            round: None,
        }
    }

    fn push(&mut self, text: impl Into<String>, level: MessageLevel) {
        self.log.push(MessageEntry::new(text, self.round, level));
    }

    fn on_playback(&mut self, event: &PlaybackEvent) -> EventImpact {
        match event {
            PlaybackEvent::EffectApplied {
                target,
                kind,
                value,
                critical,
                ..
            } => {
                self.push(
                    format::effect_message(*target, *kind, *value, *critical),
                    MessageLevel::Info,
                );
                EventImpact::redraw()
            }
            PlaybackEvent::Reconciled { round } => {
                // The next round's messages carry the next number.
                self.round = Some(round + 1);
                EventImpact::redraw()
            }
            PlaybackEvent::WinnerShown { winner } => {
                self.push(format::winner_banner(Some(*winner)), MessageLevel::Success);
                EventImpact::redraw()
            }
            // Per-step animation is drawn from the view model only.
            _ => EventImpact::redraw(),
        }
    }

    fn on_session(&mut self, event: &SessionEvent) -> EventImpact {
        match event {
            SessionEvent::Started {
                game_id,
                player_name,
                difficulty,
                auto_mode,
                round,
            } => {
                self.round = Some(*round);
                let mode = if *auto_mode { "auto" } else { "manual" };
                self.push(
                    format!("Battle {game_id} started: {player_name} vs Dragon King ({difficulty}, {mode})"),
                    MessageLevel::Success,
                );
            }
            SessionEvent::ActionSent { skill, .. } => {
                self.push(format!("You use {}", skill.label()), MessageLevel::Info);
            }
            SessionEvent::ActionRejected { reason, .. } => {
                self.push(format!("Cannot act: {reason}"), MessageLevel::Warning);
            }
            SessionEvent::AutoModeChanged { enabled } => {
                let text = if *enabled {
                    "Auto battle on"
                } else {
                    "Auto battle off"
                };
                self.push(text, MessageLevel::Info);
            }
            SessionEvent::Ended { winner, .. } => {
                self.hooks.on_battle_finished(*winner);
            }
            SessionEvent::TornDown { game_id } => {
                self.push(format!("Battle {game_id} closed"), MessageLevel::Info);
                self.round = None;
            }
            SessionEvent::Closed { game_id } => {
                self.push(format!("Battle {game_id} abandoned"), MessageLevel::Info);
                self.round = None;
            }
            SessionEvent::Notice(notice) => {
                self.hooks.on_notice(notice);
                self.push(
                    format!("{}: {}", notice.title, notice.message),
                    notice.level.into(),
                );
            }
            // Failures arrive with a notice; logging both would duplicate.
            SessionEvent::StartFailed { .. }
            | SessionEvent::RequestFailed { .. }
            | SessionEvent::RoundRejected { .. }
            | SessionEvent::AutoRoundRequested { .. }
            | SessionEvent::ControlsChanged(_) => {}
        }
        EventImpact::redraw()
    }

    fn on_connection(&mut self, event: &ConnectionEvent) -> EventImpact {
        match event {
            ConnectionEvent::Connected => self.push("Connected to server", MessageLevel::Success),
            ConnectionEvent::Disconnected { reason } => {
                self.push(format!("Disconnected: {reason}"), MessageLevel::Warning)
            }
            // Retries are visible in the header; only the final outcome is logged.
            ConnectionEvent::ConnectionFailed { .. } => {}
            ConnectionEvent::PollingEnabled => self.push(
                "Live updates unavailable, polling statistics instead",
                MessageLevel::Warning,
            ),
        }
        EventImpact::redraw()
    }

    fn on_stats(&mut self, event: &StatsEvent) -> EventImpact {
        match event {
            StatsEvent::Overview(overview) => {
                self.hooks.on_stats_refreshed(overview);
                for achievement in self.achievements.unlock_from(overview) {
                    self.push(
                        format!("Achievement unlocked: {}", achievement.title()),
                        MessageLevel::Success,
                    );
                    self.hooks.on_achievement(achievement);
                }
            }
            StatsEvent::GameFinished(record) => {
                self.push(
                    format!(
                        "{} finished battle {} in {} rounds (winner: {})",
                        record.player_name,
                        record.game_id,
                        record.total_rounds,
                        format::winner_label(record.winner)
                    ),
                    MessageLevel::Info,
                );
            }
            StatsEvent::Characters(_) | StatsEvent::RecentGames(_) => {}
        }
        EventImpact::redraw()
    }
}

impl EventConsumer for CliEventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        match event {
            Event::Playback(event) => self.on_playback(event),
            Event::Session(event) => self.on_session(event),
            Event::Connection(event) => self.on_connection(event),
            Event::Stats(event) => self.on_stats(event),
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn set_hooks(&mut self, hooks: Box<dyn SessionHooks>) {
        self.hooks = hooks;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use battle_protocol::{EffectKind, GameId, OverallStats, Side, Winner};
    use client_frontend_core::{Achievement, NoopHooks};
    use runtime::Notice;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingHooks {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl SessionHooks for RecordingHooks {
        fn on_notice(&mut self, notice: &Notice) {
            self.calls.lock().unwrap().push(format!("notice:{}", notice.title));
        }

        fn on_battle_finished(&mut self, winner: Option<Winner>) {
            self.calls.lock().unwrap().push(format!("finished:{winner:?}"));
        }

        fn on_achievement(&mut self, achievement: Achievement) {
            self.calls.lock().unwrap().push(format!("achievement:{achievement:?}"));
        }
    }

    fn texts(consumer: &CliEventConsumer) -> Vec<String> {
        consumer
            .message_log()
            .iter()
            .map(|entry| entry.text.clone())
            .collect()
    }

    #[test]
    fn effects_are_logged_with_their_round() {
        let mut consumer = CliEventConsumer::new(MessageLog::new(16), Box::new(NoopHooks));
        consumer.on_event(&Event::Session(SessionEvent::Started {
            game_id: GameId(1),
            player_name: "Ari".to_string(),
            difficulty: Default::default(),
            auto_mode: false,
            round: 2,
        }));
        consumer.on_event(&Event::Playback(PlaybackEvent::EffectApplied {
            index: 0,
            target: Side::Dragon,
            kind: EffectKind::Damage,
            value: 5,
            critical: false,
        }));

        let last = consumer.message_log().recent(1).next().unwrap();
        assert_eq!(last.text, "Hero hits Dragon King for 5");
        assert_eq!(last.round, Some(2));
    }

    #[test]
    fn hooks_fire_on_milestones() {
        let hooks = RecordingHooks::default();
        let calls = Arc::clone(&hooks.calls);
        let mut consumer = CliEventConsumer::new(MessageLog::new(16), Box::new(hooks));

        consumer.on_event(&Event::Session(SessionEvent::Notice(Notice::error(
            "Request failed",
            "timeout",
        ))));
        consumer.on_event(&Event::Session(SessionEvent::Ended {
            game_id: GameId(1),
            winner: Some(Winner::Dragon),
        }));
        consumer.on_event(&Event::Stats(StatsEvent::Overview(OverallStats {
            total_games: 1,
            ..OverallStats::default()
        })));

        assert_eq!(
            *calls.lock().unwrap(),
            [
                "notice:Request failed",
                "finished:Some(Dragon)",
                "achievement:FirstBattle"
            ]
        );
        assert!(texts(&consumer).contains(&"Achievement unlocked: First Blood".to_string()));
    }

    #[test]
    fn failures_are_logged_once_through_their_notice() {
        let mut consumer = CliEventConsumer::new(MessageLog::new(16), Box::new(NoopHooks));
        consumer.on_event(&Event::Session(SessionEvent::RoundRejected {
            game_id: GameId(1),
            error: "skill on cooldown".to_string(),
        }));
        consumer.on_event(&Event::Session(SessionEvent::Notice(Notice::warning(
            "Action refused",
            "skill on cooldown",
        ))));
        assert_eq!(texts(&consumer), ["Action refused: skill on cooldown"]);
    }
}
