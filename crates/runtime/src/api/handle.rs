//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the active battle, streaming events from specific topics, and
//! querying the backend's read-only endpoints.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use battle_protocol::{
    CharacterStats, DamageEntry, Difficulty, GameId, GameRecord, OverallStats, PlayerStanding,
    ReplayEvent, RoundsEntry, SkillId,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::session::{GateDecision, SessionSnapshot};
use crate::transport::BattleApi;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    api: Arc<dyn BattleApi>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        api: Arc<dyn BattleApi>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            api,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Start a new battle, replacing the active one once the backend accepts.
    ///
    /// Resolves after the initial state has been published.
    pub async fn start_battle(
        &self,
        player_name: impl Into<String>,
        difficulty: Difficulty,
        auto_mode: bool,
    ) -> Result<GameId> {
        let player_name = player_name.into();
        self.request(|reply| Command::StartBattle {
            player_name,
            difficulty,
            auto_mode,
            reply,
        })
        .await?
    }

    /// Submit a hero skill through the input gate
    pub async fn submit(&self, skill: SkillId) -> Result<GateDecision> {
        self.request(|reply| Command::Submit { skill, reply }).await
    }

    /// Switch auto mode on or off for the active battle
    pub async fn set_auto_mode(&self, enabled: bool) -> Result<()> {
        self.request(|reply| Command::SetAutoMode { enabled, reply })
            .await?
    }

    /// Close the active battle. Returns false if none was open.
    pub async fn close_battle(&self) -> Result<bool> {
        self.request(|reply| Command::CloseBattle { reply }).await
    }

    /// Snapshot of the active battle, if any
    pub async fn session(&self) -> Result<Option<SessionSnapshot>> {
        self.request(|reply| Command::QuerySession { reply }).await
    }

    /// Ask the worker to refresh overview, per-side stats and recent games
    pub async fn refresh_stats(&self) -> Result<()> {
        self.command_tx
            .send(Command::RefreshStats)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Playback` - Paced animation steps of the current round
    /// - `Topic::Session` - Battle lifecycle, controls and notices
    /// - `Topic::Connection` - Push channel health
    /// - `Topic::Stats` - Refreshed statistics and finished games
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut playback_rx = handle.subscribe(Topic::Playback);
    /// while let Ok(event) = playback_rx.recv().await {
    ///     // Render the step
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub async fn overview(&self) -> Result<OverallStats> {
        Ok(self.api.overall_stats().await?)
    }

    pub async fn character_stats(&self) -> Result<CharacterStats> {
        Ok(self.api.character_stats().await?)
    }

    pub async fn recent_games(&self) -> Result<Vec<GameRecord>> {
        Ok(self.api.recent_games().await?)
    }

    pub async fn all_games(&self) -> Result<Vec<GameRecord>> {
        Ok(self.api.all_games().await?)
    }

    pub async fn game(&self, game_id: GameId) -> Result<GameRecord> {
        Ok(self.api.game(game_id).await?)
    }

    pub async fn replay(&self, game_id: GameId) -> Result<Vec<ReplayEvent>> {
        Ok(self.api.replay(game_id).await?)
    }

    pub async fn damage_leaderboard(&self) -> Result<Vec<DamageEntry>> {
        Ok(self.api.damage_leaderboard().await?)
    }

    pub async fn rounds_leaderboard(&self) -> Result<Vec<RoundsEntry>> {
        Ok(self.api.rounds_leaderboard().await?)
    }

    pub async fn player_leaderboard(&self) -> Result<Vec<PlayerStanding>> {
        Ok(self.api.player_leaderboard().await?)
    }
}
