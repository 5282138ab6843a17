//! ViewModelUpdater service layer for event-driven incremental updates.
//!
//! This service interprets Events from the runtime and applies them to the
//! ViewModel in place.
//!
//! # Architecture
//!
//! - `UpdateScope`: Bitflags tracking which parts of ViewModel changed (for selective rendering)
//! - `ViewModelUpdater`: Service applying runtime Events to ViewModel

use std::time::Instant;

use bitflags::bitflags;
use runtime::{ConnectionEvent, Event, PlaybackEvent, SessionEvent, StatsEvent};

use crate::config::TimingConfig;
use crate::format;
use crate::view_model::{ActiveNotice, BattleView, ConnectionView, FloatingText, ViewModel};

// ============================================================================
// UpdateScope - Fine-grained change tracking
// ============================================================================

bitflags! {
    /// Tracks which parts of ViewModel have been updated.
    ///
    /// This enables widgets to skip rendering unchanged areas.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct UpdateScope: u32 {
        /// Battle metadata changed (round, mode, winner, status line).
        const BATTLE       = 0b0000_0001;

        /// Fighter panels changed (HP, markers, floating numbers).
        const FIGHTERS     = 0b0000_0010;

        /// Skill button enablement or cooldowns changed.
        const CONTROLS     = 0b0000_0100;

        /// Push channel health changed.
        const CONNECTION   = 0b0000_1000;

        /// Overview or per-side stats changed.
        const STATS        = 0b0001_0000;

        /// Battle history changed.
        const HISTORY      = 0b0010_0000;

        /// Achievements were unlocked.
        const ACHIEVEMENTS = 0b0100_0000;

        /// Notice banner appeared or expired.
        const NOTICE       = 0b1000_0000;

        /// Anything on the battle screen.
        const ARENA = Self::BATTLE.bits() | Self::FIGHTERS.bits() | Self::CONTROLS.bits();

        const ALL = Self::ARENA.bits()
                  | Self::CONNECTION.bits()
                  | Self::STATS.bits()
                  | Self::HISTORY.bits()
                  | Self::ACHIEVEMENTS.bits()
                  | Self::NOTICE.bits();
    }
}

impl UpdateScope {
    /// Returns true if anything on the battle screen changed.
    pub fn touches_arena(&self) -> bool {
        self.intersects(Self::ARENA)
    }
}

impl Default for UpdateScope {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// ViewModelUpdater - Event-driven ViewModel updates
// ============================================================================

/// Service interpreting runtime Events and updating ViewModel in place.
///
/// Holds only the lifetimes of transient elements; all state lives in the
/// ViewModel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewModelUpdater {
    timing: TimingConfig,
}

impl ViewModelUpdater {
    pub fn new(timing: TimingConfig) -> Self {
        Self { timing }
    }

    /// Update ViewModel based on runtime Event.
    ///
    /// `now` stamps transient elements (floating numbers, notices) so
    /// [`ViewModelUpdater::expire`] can drop them later.
    pub fn update(&self, view_model: &mut ViewModel, event: &Event, now: Instant) -> UpdateScope {
        match event {
            Event::Playback(event) => self.apply_playback(view_model, event, now),
            Event::Session(event) => self.apply_session(view_model, event, now),
            Event::Connection(event) => Self::apply_connection(view_model, event),
            Event::Stats(event) => Self::apply_stats(view_model, event),
        }
    }

    /// Drops floating numbers and notices whose time is up.
    pub fn expire(&self, view_model: &mut ViewModel, now: Instant) -> UpdateScope {
        let mut scope = UpdateScope::empty();

        if let Some(battle) = view_model.battle.as_mut() {
            let before = battle.floating.len();
            battle.floating.retain(|text| text.expires_at > now);
            if battle.floating.len() != before {
                scope |= UpdateScope::FIGHTERS;
            }
        }

        if view_model
            .notice
            .as_ref()
            .is_some_and(|notice| notice.expires_at <= now)
        {
            view_model.notice = None;
            scope |= UpdateScope::NOTICE;
        }

        scope
    }

    fn apply_playback(
        &self,
        view_model: &mut ViewModel,
        event: &PlaybackEvent,
        now: Instant,
    ) -> UpdateScope {
        if let PlaybackEvent::CooldownsUpdated { cooldowns } = event {
            view_model.controls.cooldowns = cooldowns.clone();
            return UpdateScope::CONTROLS;
        }

        // Steps of a battle that was already dismissed are dropped.
        let Some(battle) = view_model.battle.as_mut() else {
            return UpdateScope::empty();
        };

        match event {
            PlaybackEvent::StatusCleared => {
                battle.status = None;
                battle.clear_markers();
                UpdateScope::BATTLE | UpdateScope::FIGHTERS
            }
            PlaybackEvent::ActorActing { actor, .. } => {
                battle.clear_markers();
                battle.fighter_mut(*actor).acting = true;
                battle.status = Some(format!("{} is acting...", actor.title()));
                UpdateScope::BATTLE | UpdateScope::FIGHTERS
            }
            PlaybackEvent::EffectApplied { target, kind, .. } => {
                battle.clear_markers();
                battle.fighter_mut(*target).hit = Some(*kind);
                UpdateScope::FIGHTERS
            }
            PlaybackEvent::FloatingDelta { target, kind, value } => {
                battle.floating.push(FloatingText {
                    target: *target,
                    kind: *kind,
                    text: format::floating_delta(*kind, *value),
                    expires_at: now + self.timing.floating_text,
                });
                UpdateScope::FIGHTERS
            }
            PlaybackEvent::CriticalShown { target } => {
                battle.fighter_mut(*target).critical = true;
                UpdateScope::FIGHTERS
            }
            PlaybackEvent::HpDisplayed {
                side, hp, max_hp, ..
            } => {
                battle.fighter_mut(*side).set_hp(*hp, *max_hp);
                UpdateScope::FIGHTERS
            }
            PlaybackEvent::Reconciled { round } => {
                battle.round = *round;
                battle.clear_markers();
                battle.status = None;
                UpdateScope::BATTLE | UpdateScope::FIGHTERS
            }
            PlaybackEvent::WinnerShown { winner } => {
                battle.winner = Some(*winner);
                battle.ended = true;
                battle.status = Some(format::winner_banner(Some(*winner)));
                UpdateScope::BATTLE
            }
            PlaybackEvent::CooldownsUpdated { .. } => UpdateScope::empty(),
        }
    }

    fn apply_session(
        &self,
        view_model: &mut ViewModel,
        event: &SessionEvent,
        now: Instant,
    ) -> UpdateScope {
        match event {
            SessionEvent::Started {
                game_id,
                player_name,
                difficulty,
                auto_mode,
                round,
            } => {
                view_model.battle = Some(BattleView::new(
                    *game_id,
                    player_name.clone(),
                    *difficulty,
                    *auto_mode,
                    *round,
                ));
                view_model.controls.auto_mode = *auto_mode;
                view_model.controls.finished = false;
                UpdateScope::ARENA
            }
            SessionEvent::ActionSent { skill, .. } => {
                Self::set_status(view_model, format!("{}!", skill.label()))
            }
            SessionEvent::AutoRoundRequested { .. } => {
                Self::set_status(view_model, "Auto battle in progress...".to_string())
            }
            SessionEvent::RequestFailed { .. } | SessionEvent::RoundRejected { .. } => {
                match view_model.battle.as_mut() {
                    Some(battle) => {
                        battle.status = None;
                        UpdateScope::BATTLE
                    }
                    None => UpdateScope::empty(),
                }
            }
            SessionEvent::ControlsChanged(controls) => {
                view_model.controls = controls.clone();
                UpdateScope::CONTROLS
            }
            SessionEvent::AutoModeChanged { enabled } => {
                view_model.controls.auto_mode = *enabled;
                if let Some(battle) = view_model.battle.as_mut() {
                    battle.auto_mode = *enabled;
                }
                UpdateScope::BATTLE | UpdateScope::CONTROLS
            }
            SessionEvent::Ended { winner, .. } => match view_model.battle.as_mut() {
                Some(battle) => {
                    battle.ended = true;
                    battle.winner = battle.winner.or(*winner);
                    view_model.controls.finished = true;
                    UpdateScope::BATTLE | UpdateScope::CONTROLS
                }
                None => UpdateScope::empty(),
            },
            SessionEvent::TornDown { game_id } | SessionEvent::Closed { game_id } => {
                if view_model
                    .battle
                    .as_ref()
                    .is_some_and(|battle| battle.game_id == *game_id)
                {
                    view_model.battle = None;
                    view_model.controls = Default::default();
                    UpdateScope::ARENA
                } else {
                    UpdateScope::empty()
                }
            }
            SessionEvent::Notice(notice) => {
                view_model.notice = Some(ActiveNotice {
                    notice: notice.clone(),
                    expires_at: now + self.timing.notice,
                });
                UpdateScope::NOTICE
            }
            SessionEvent::StartFailed { .. } | SessionEvent::ActionRejected { .. } => {
                // Surfaced through the accompanying notice / message log.
                UpdateScope::empty()
            }
        }
    }

    fn set_status(view_model: &mut ViewModel, status: String) -> UpdateScope {
        match view_model.battle.as_mut() {
            Some(battle) => {
                battle.status = Some(status);
                UpdateScope::BATTLE
            }
            None => UpdateScope::empty(),
        }
    }

    fn apply_connection(view_model: &mut ViewModel, event: &ConnectionEvent) -> UpdateScope {
        let next = match event {
            ConnectionEvent::Connected => ConnectionView::Online,
            ConnectionEvent::Disconnected { .. } => ConnectionView::Reconnecting { attempt: 0 },
            ConnectionEvent::ConnectionFailed { attempt, .. } => {
                ConnectionView::Reconnecting { attempt: *attempt }
            }
            ConnectionEvent::PollingEnabled => ConnectionView::Polling,
        };

        if view_model.connection == next {
            return UpdateScope::empty();
        }
        view_model.connection = next;
        UpdateScope::CONNECTION
    }

    fn apply_stats(view_model: &mut ViewModel, event: &StatsEvent) -> UpdateScope {
        match event {
            StatsEvent::Overview(overview) => {
                view_model.stats.overview = Some(overview.clone());
                let unlocked = view_model.achievements.unlock_from(overview);
                if unlocked.is_empty() {
                    UpdateScope::STATS
                } else {
                    UpdateScope::STATS | UpdateScope::ACHIEVEMENTS
                }
            }
            StatsEvent::Characters(characters) => {
                view_model.stats.characters = Some(characters.clone());
                UpdateScope::STATS
            }
            StatsEvent::RecentGames(games) => {
                view_model.history.set_recent(games.clone());
                UpdateScope::HISTORY
            }
            StatsEvent::GameFinished(record) => {
                view_model.history.record_finished(record.clone());
                UpdateScope::HISTORY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use battle_protocol::{
        Cooldowns, Difficulty, EffectKind, GameId, OverallStats, Side, SkillId, Winner,
    };
    use runtime::{ControlState, Notice};

    use super::*;
    use crate::achievements::Achievement;

    fn started(view_model: &mut ViewModel, updater: &ViewModelUpdater, now: Instant) {
        updater.update(
            view_model,
            &Event::Session(SessionEvent::Started {
                game_id: GameId(7),
                player_name: "Ari".to_string(),
                difficulty: Difficulty::Normal,
                auto_mode: false,
                round: 1,
            }),
            now,
        );
    }

    fn hp(side: Side, hp: u32, authoritative: bool) -> Event {
        Event::Playback(PlaybackEvent::HpDisplayed {
            side,
            hp,
            max_hp: Some(20),
            authoritative,
        })
    }

    #[test]
    fn playback_steps_drive_fighter_panels() {
        let updater = ViewModelUpdater::default();
        let mut vm = ViewModel::new();
        let now = Instant::now();
        started(&mut vm, &updater, now);

        updater.update(&mut vm, &hp(Side::Dragon, 20, true), now);
        let scope = updater.update(
            &mut vm,
            &Event::Playback(PlaybackEvent::ActorActing {
                actor: Side::Person,
                index: 0,
            }),
            now,
        );
        assert!(scope.contains(UpdateScope::FIGHTERS));
        assert!(vm.battle.as_ref().unwrap().person.acting);

        updater.update(
            &mut vm,
            &Event::Playback(PlaybackEvent::EffectApplied {
                index: 0,
                target: Side::Dragon,
                kind: EffectKind::Damage,
                value: 8,
                critical: true,
            }),
            now,
        );
        updater.update(
            &mut vm,
            &Event::Playback(PlaybackEvent::CriticalShown {
                target: Side::Dragon,
            }),
            now,
        );
        updater.update(&mut vm, &hp(Side::Dragon, 12, false), now);

        let battle = vm.battle.as_ref().unwrap();
        assert!(!battle.person.acting);
        assert_eq!(battle.dragon.hit, Some(EffectKind::Damage));
        assert!(battle.dragon.critical);
        assert_eq!(battle.dragon.hp, 12);

        updater.update(
            &mut vm,
            &Event::Playback(PlaybackEvent::Reconciled { round: 2 }),
            now,
        );
        let battle = vm.battle.as_ref().unwrap();
        assert_eq!(battle.round, 2);
        assert!(!battle.dragon.critical);
    }

    #[test]
    fn floating_numbers_and_notices_expire() {
        let updater = ViewModelUpdater::new(TimingConfig {
            floating_text: Duration::from_millis(1000),
            notice: Duration::from_millis(3000),
        });
        let mut vm = ViewModel::new();
        let now = Instant::now();
        started(&mut vm, &updater, now);

        updater.update(
            &mut vm,
            &Event::Playback(PlaybackEvent::FloatingDelta {
                target: Side::Person,
                kind: EffectKind::Heal,
                value: 4,
            }),
            now,
        );
        updater.update(
            &mut vm,
            &Event::Session(SessionEvent::Notice(Notice::warning("Action refused", "busy"))),
            now,
        );
        assert_eq!(vm.battle.as_ref().unwrap().floating[0].text, "+4");

        let scope = updater.expire(&mut vm, now + Duration::from_millis(1500));
        assert_eq!(scope, UpdateScope::FIGHTERS);
        assert!(vm.battle.as_ref().unwrap().floating.is_empty());
        assert!(vm.notice.is_some());

        let scope = updater.expire(&mut vm, now + Duration::from_millis(3000));
        assert_eq!(scope, UpdateScope::NOTICE);
        assert!(vm.notice.is_none());
    }

    #[test]
    fn teardown_only_clears_the_matching_battle() {
        let updater = ViewModelUpdater::default();
        let mut vm = ViewModel::new();
        let now = Instant::now();
        started(&mut vm, &updater, now);

        let stale = updater.update(
            &mut vm,
            &Event::Session(SessionEvent::TornDown { game_id: GameId(3) }),
            now,
        );
        assert!(stale.is_empty());
        assert!(vm.has_battle());

        updater.update(
            &mut vm,
            &Event::Session(SessionEvent::Ended {
                game_id: GameId(7),
                winner: Some(Winner::Dragon),
            }),
            now,
        );
        assert!(vm.battle_ended());
        assert!(vm.controls.finished);

        updater.update(
            &mut vm,
            &Event::Session(SessionEvent::TornDown { game_id: GameId(7) }),
            now,
        );
        assert!(!vm.has_battle());
        assert_eq!(vm.controls, ControlState::default());
    }

    #[test]
    fn controls_mirror_the_gate() {
        let updater = ViewModelUpdater::default();
        let mut vm = ViewModel::new();
        let controls = ControlState {
            locked: false,
            auto_mode: false,
            finished: false,
            cooldowns: Cooldowns::new().with(SkillId::HEAL, 2),
        };

        let scope = updater.update(
            &mut vm,
            &Event::Session(SessionEvent::ControlsChanged(controls)),
            Instant::now(),
        );
        assert_eq!(scope, UpdateScope::CONTROLS);
        assert!(vm.controls.is_enabled(SkillId::ATTACK));
        assert!(!vm.controls.is_enabled(SkillId::HEAL));
    }

    #[test]
    fn overview_unlocks_achievements_once() {
        let updater = ViewModelUpdater::default();
        let mut vm = ViewModel::new();
        let overview = Event::Stats(StatsEvent::Overview(OverallStats {
            total_games: 1,
            ..OverallStats::default()
        }));

        let scope = updater.update(&mut vm, &overview, Instant::now());
        assert!(scope.contains(UpdateScope::ACHIEVEMENTS));
        assert!(vm.achievements.is_unlocked(Achievement::FirstBattle));

        let scope = updater.update(&mut vm, &overview, Instant::now());
        assert_eq!(scope, UpdateScope::STATS);
    }

    #[test]
    fn connection_changes_are_deduplicated() {
        let updater = ViewModelUpdater::default();
        let mut vm = ViewModel::new();
        let connected = Event::Connection(ConnectionEvent::Connected);

        assert_eq!(
            updater.update(&mut vm, &connected, Instant::now()),
            UpdateScope::CONNECTION
        );
        assert!(updater.update(&mut vm, &connected, Instant::now()).is_empty());
        updater.update(
            &mut vm,
            &Event::Connection(ConnectionEvent::PollingEnabled),
            Instant::now(),
        );
        assert_eq!(vm.connection, ConnectionView::Polling);
    }
}
