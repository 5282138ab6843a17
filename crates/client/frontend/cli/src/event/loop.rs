//! Event loop orchestrating runtime events, user input, and rendering.
//!
//! This module coordinates three main concerns:
//! - Runtime event consumption and ViewModel updates (via ViewModelUpdater)
//! - Keyboard input processing (skills, battle controls and UI navigation)
//! - Results of background queries (leaderboards, replays)

use std::collections::HashMap;
use std::time::Instant;

use anyhow::Result;
use battle_protocol::{DamageEntry, GameRecord, PlayerStanding, ReplayEvent, RoundsEntry};
use client_bootstrap::{Preferences, PreferencesStore};
use client_frontend_core::{
    EventConsumer, ViewModelUpdater,
    message::MessageLevel,
    view_model::{ViewModel, stats::Replay},
};
use runtime::{Event as RuntimeEvent, RuntimeHandle, StatsEvent, Topic};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, mpsc},
    time::{self, Duration},
};

use crate::{config::CliConfig, input::InputHandler, presentation::terminal::Tui, state::AppState};

const FRAME_INTERVAL_MS: u64 = 16;
const EXPIRY_INTERVAL_MS: u64 = 100;
const UI_CHANNEL_CAPACITY: usize = 16;

/// Topics the terminal UI listens to.
pub const TOPICS: [Topic; 4] = [
    Topic::Playback,
    Topic::Session,
    Topic::Connection,
    Topic::Stats,
];

/// Result of a query spawned off the loop.
#[derive(Debug)]
pub(crate) enum UiUpdate {
    Leaderboards {
        damage: Vec<DamageEntry>,
        rounds: Vec<RoundsEntry>,
        players: Vec<PlayerStanding>,
    },
    Replay {
        game: GameRecord,
        events: Vec<ReplayEvent>,
    },
    Failed {
        what: &'static str,
        error: String,
    },
}

/// Event loop managing ViewModel state and coordinating UI updates.
///
/// This is the main orchestrator that:
/// - Owns the ViewModel (single source of truth for presentation state)
/// - Uses ViewModelUpdater service to apply runtime events incrementally
/// - Handles user input and forwards it to the runtime through the handle
pub struct EventLoop<C>
where
    C: EventConsumer,
{
    pub(crate) subscriptions: HashMap<Topic, broadcast::Receiver<RuntimeEvent>>,
    pub(crate) handle: RuntimeHandle,
    pub(crate) input: InputHandler,
    pub(crate) consumer: C,
    pub(crate) app_state: AppState,
    /// Owned ViewModel - incrementally updated via ViewModelUpdater
    pub(crate) view_model: ViewModel,
    pub(crate) updater: ViewModelUpdater,
    pub(crate) cli_config: CliConfig,
    pub(crate) preferences: Preferences,
    /// `None` keeps preferences in memory only.
    pub(crate) preferences_store: Option<PreferencesStore>,
    pub(crate) ui_tx: mpsc::Sender<UiUpdate>,
    ui_rx: mpsc::Receiver<UiUpdate>,
}

impl<C> EventLoop<C>
where
    C: EventConsumer,
{
    pub fn new(
        handle: RuntimeHandle,
        consumer: C,
        updater: ViewModelUpdater,
        cli_config: CliConfig,
        preferences: Preferences,
        preferences_store: Option<PreferencesStore>,
    ) -> Self {
        let subscriptions = handle.subscribe_multiple(&TOPICS);
        let (ui_tx, ui_rx) = mpsc::channel(UI_CHANNEL_CAPACITY);

        Self {
            subscriptions,
            handle,
            input: InputHandler::new(),
            consumer,
            app_state: AppState::new(&preferences),
            view_model: ViewModel::new(),
            updater,
            cli_config,
            preferences,
            preferences_store,
            ui_tx,
            ui_rx,
        }
    }

    pub async fn run(mut self, terminal: &mut Tui) -> Result<C> {
        self.render(terminal)?;

        if let Err(err) = self.handle.refresh_stats().await {
            tracing::warn!("Initial stats refresh failed: {}", err);
        }

        let mut playback_rx = self.subscriptions.remove(&Topic::Playback);
        let mut session_rx = self.subscriptions.remove(&Topic::Session);
        let mut connection_rx = self.subscriptions.remove(&Topic::Connection);
        let mut stats_rx = self.subscriptions.remove(&Topic::Stats);

        let mut expiry_interval = time::interval(Duration::from_millis(EXPIRY_INTERVAL_MS));
        expiry_interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            let quit = tokio::select! {
                result = recv(&mut playback_rx) => self.handle_runtime_event(result, terminal)?,
                result = recv(&mut session_rx) => self.handle_runtime_event(result, terminal)?,
                result = recv(&mut connection_rx) => self.handle_runtime_event(result, terminal)?,
                result = recv(&mut stats_rx) => self.handle_runtime_event(result, terminal)?,
                Some(update) = self.ui_rx.recv() => {
                    self.apply_ui_update(update);
                    self.render(terminal)?;
                    false
                }
                _ = time::sleep(Duration::from_millis(FRAME_INTERVAL_MS)) => {
                    self.handle_input_tick(terminal).await?
                }
                _ = expiry_interval.tick() => {
                    if !self.updater.expire(&mut self.view_model, Instant::now()).is_empty() {
                        self.render(terminal)?;
                    }
                    false
                }
            };

            if quit {
                break;
            }
        }

        Ok(self.consumer)
    }

    /// Handle runtime event and update ViewModel incrementally.
    fn handle_runtime_event(
        &mut self,
        result: Result<RuntimeEvent, RecvError>,
        terminal: &mut Tui,
    ) -> Result<bool> {
        match result {
            Ok(event) => {
                let impact = self.consumer.on_event(&event);
                let scope = self
                    .updater
                    .update(&mut self.view_model, &event, Instant::now());

                if matches!(event, RuntimeEvent::Stats(StatsEvent::GameFinished(_)))
                    && self.view_model.leaderboards.loaded
                {
                    self.load_leaderboards();
                }

                // Only render if something actually changed
                if impact.requires_redraw || !scope.is_empty() {
                    self.render(terminal)?;
                }
                Ok(false)
            }
            Err(RecvError::Closed) => {
                tracing::warn!("Event stream closed");
                Ok(true)
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Dropped {} stale events", skipped);
                Ok(false)
            }
        }
    }

    fn apply_ui_update(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Leaderboards {
                damage,
                rounds,
                players,
            } => {
                let boards = &mut self.view_model.leaderboards;
                boards.damage = damage;
                boards.rounds = rounds;
                boards.players = players;
                boards.loaded = true;
            }
            UiUpdate::Replay { game, events } => {
                self.view_model.history.replay =
                    Some(Replay { game, events });
            }
            UiUpdate::Failed { what, error } => {
                tracing::warn!("Failed to load {}: {}", what, error);
                self.consumer.message_log_mut().push_level(
                    format!("Could not load {what}: {error}"),
                    MessageLevel::Error,
                );
            }
        }
    }

    /// Fetch all three leaderboards off the loop.
    pub(crate) fn load_leaderboards(&self) {
        let handle = self.handle.clone();
        let ui_tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = tokio::try_join!(
                handle.damage_leaderboard(),
                handle.rounds_leaderboard(),
                handle.player_leaderboard()
            );
            let update = match result {
                Ok((damage, rounds, players)) => UiUpdate::Leaderboards {
                    damage,
                    rounds,
                    players,
                },
                Err(err) => UiUpdate::Failed {
                    what: "leaderboards",
                    error: err.to_string(),
                },
            };
            // The loop may already be gone on shutdown.
            let _ = ui_tx.send(update).await;
        });
    }

    /// Fetch the replay of `game` off the loop.
    pub(crate) fn load_replay(&self, game: GameRecord) {
        let handle = self.handle.clone();
        let ui_tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let update = match handle.replay(game.game_id).await {
                Ok(events) => UiUpdate::Replay { game, events },
                Err(err) => UiUpdate::Failed {
                    what: "replay",
                    error: err.to_string(),
                },
            };
            let _ = ui_tx.send(update).await;
        });
    }

    /// Persist preferences, logging instead of failing the UI.
    pub(crate) fn save_preferences(&self) {
        if let Some(store) = &self.preferences_store
            && let Err(err) = store.save(&self.preferences)
        {
            tracing::warn!("Failed to save preferences: {:#}", err);
        }
    }
}

/// Receive from an optional subscription; a missing topic never resolves.
async fn recv(
    rx: &mut Option<broadcast::Receiver<RuntimeEvent>>,
) -> Result<RuntimeEvent, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
