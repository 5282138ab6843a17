//! In-memory transports for testing without a backend.
//!
//! [`MockBattleApi`] records every call and answers from canned data;
//! [`MockPushConnector`] hands out push connections whose server side is
//! driven by the test.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use battle_protocol::{
    ActionRequest, AutoRoundRequest, CharacterStats, ClientPush, Cooldowns, DamageEntry, GameId,
    GameRecord, OverallStats, PlayerStanding, ReplayEvent, RoundResult, RoundsEntry, ServerPush,
    SkillId, StartBattleRequest, StartedBattle,
};

use super::push::{PushConnection, PushConnector};
use super::{BattleApi, TransportError, TransportResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Snapshot every mock battle starts from unless overridden.
pub fn default_initial_round() -> RoundResult {
    RoundResult::new(1, 20, 20)
        .with_max_hp(20, 20)
        .with_cooldowns(Cooldowns::new().with(SkillId::ULTIMATE, 3))
}

#[derive(Default)]
struct ApiState {
    next_game_id: u64,
    initial: Option<RoundResult>,
    start_failures: VecDeque<TransportError>,
    action_failures: VecDeque<TransportError>,
    auto_failures: VecDeque<TransportError>,
    round_latency: Duration,

    starts: Vec<StartBattleRequest>,
    actions: Vec<ActionRequest>,
    auto_requests: Vec<AutoRoundRequest>,
    overview_calls: usize,

    overview: OverallStats,
    characters: CharacterStats,
    games: Vec<GameRecord>,
    replay: Vec<ReplayEvent>,
    damage_board: Vec<DamageEntry>,
    rounds_board: Vec<RoundsEntry>,
    players_board: Vec<PlayerStanding>,
}

/// Call-recording [`BattleApi`].
#[derive(Clone, Default)]
pub struct MockBattleApi {
    state: Arc<Mutex<ApiState>>,
}

impl MockBattleApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot returned by subsequent successful starts.
    pub fn set_initial_round(&self, round: RoundResult) {
        lock(&self.state).initial = Some(round);
    }

    pub fn fail_next_start(&self, error: TransportError) {
        lock(&self.state).start_failures.push_back(error);
    }

    pub fn fail_next_action(&self, error: TransportError) {
        lock(&self.state).action_failures.push_back(error);
    }

    pub fn fail_next_auto_round(&self, error: TransportError) {
        lock(&self.state).auto_failures.push_back(error);
    }

    /// Delays the answer to every round request by `latency`.
    pub fn set_round_latency(&self, latency: Duration) {
        lock(&self.state).round_latency = latency;
    }

    pub fn set_overview(&self, overview: OverallStats) {
        lock(&self.state).overview = overview;
    }

    pub fn set_games(&self, games: Vec<GameRecord>) {
        lock(&self.state).games = games;
    }

    pub fn set_replay(&self, replay: Vec<ReplayEvent>) {
        lock(&self.state).replay = replay;
    }

    pub fn starts(&self) -> Vec<StartBattleRequest> {
        lock(&self.state).starts.clone()
    }

    pub fn actions(&self) -> Vec<ActionRequest> {
        lock(&self.state).actions.clone()
    }

    pub fn auto_requests(&self) -> Vec<AutoRoundRequest> {
        lock(&self.state).auto_requests.clone()
    }

    /// Number of `GET /stats` calls, i.e. stats refreshes.
    pub fn overview_calls(&self) -> usize {
        lock(&self.state).overview_calls
    }
}

#[async_trait]
impl BattleApi for MockBattleApi {
    async fn start_battle(&self, request: &StartBattleRequest) -> TransportResult<StartedBattle> {
        let mut state = lock(&self.state);
        state.starts.push(request.clone());
        if let Some(error) = state.start_failures.pop_front() {
            return Err(error);
        }

        state.next_game_id += 1;
        let game_id = GameId(state.next_game_id);
        let initial = state
            .initial
            .clone()
            .unwrap_or_else(default_initial_round)
            .with_game_id(game_id);
        Ok(StartedBattle { game_id, initial })
    }

    async fn send_action(&self, request: ActionRequest) -> TransportResult<()> {
        let (result, latency) = {
            let mut state = lock(&self.state);
            state.actions.push(request);
            (state.action_failures.pop_front(), state.round_latency)
        };
        answer_after(latency, result).await
    }

    async fn request_auto_round(&self, request: AutoRoundRequest) -> TransportResult<()> {
        let (result, latency) = {
            let mut state = lock(&self.state);
            state.auto_requests.push(request);
            (state.auto_failures.pop_front(), state.round_latency)
        };
        answer_after(latency, result).await
    }

    async fn overall_stats(&self) -> TransportResult<OverallStats> {
        let mut state = lock(&self.state);
        state.overview_calls += 1;
        Ok(state.overview.clone())
    }

    async fn character_stats(&self) -> TransportResult<CharacterStats> {
        Ok(lock(&self.state).characters.clone())
    }

    async fn recent_games(&self) -> TransportResult<Vec<GameRecord>> {
        Ok(lock(&self.state).games.iter().take(10).cloned().collect())
    }

    async fn all_games(&self) -> TransportResult<Vec<GameRecord>> {
        Ok(lock(&self.state).games.clone())
    }

    async fn game(&self, game_id: GameId) -> TransportResult<GameRecord> {
        lock(&self.state)
            .games
            .iter()
            .find(|record| record.game_id == game_id)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                status: 404,
                body: format!("game {game_id} not found"),
            })
    }

    async fn replay(&self, _game_id: GameId) -> TransportResult<Vec<ReplayEvent>> {
        Ok(lock(&self.state).replay.clone())
    }

    async fn damage_leaderboard(&self) -> TransportResult<Vec<DamageEntry>> {
        Ok(lock(&self.state).damage_board.clone())
    }

    async fn rounds_leaderboard(&self) -> TransportResult<Vec<RoundsEntry>> {
        Ok(lock(&self.state).rounds_board.clone())
    }

    async fn player_leaderboard(&self) -> TransportResult<Vec<PlayerStanding>> {
        Ok(lock(&self.state).players_board.clone())
    }
}

async fn answer_after(latency: Duration, failure: Option<TransportError>) -> TransportResult<()> {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    failure.map_or(Ok(()), Err)
}

#[derive(Default)]
struct PushScript {
    refusals: u32,
    attempts: u32,
    sent: Vec<ClientPush>,
    server: Option<mpsc::UnboundedSender<String>>,
}

/// [`PushConnector`] whose connections are fed by the test.
#[derive(Clone, Default)]
pub struct MockPushConnector {
    state: Arc<Mutex<PushScript>>,
}

impl MockPushConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` connection attempts fail.
    pub fn refuse_next(&self, count: u32) {
        lock(&self.state).refusals = count;
    }

    pub fn attempts(&self) -> u32 {
        lock(&self.state).attempts
    }

    /// Messages the client sent, across all connections.
    pub fn sent(&self) -> Vec<ClientPush> {
        lock(&self.state).sent.clone()
    }

    /// Delivers `message` on the current connection. Returns false if none is open.
    pub fn push(&self, message: &ServerPush) -> bool {
        match serde_json::to_string(message) {
            Ok(text) => self.push_raw(text),
            Err(_) => false,
        }
    }

    pub fn push_raw(&self, text: impl Into<String>) -> bool {
        lock(&self.state)
            .server
            .as_ref()
            .is_some_and(|server| server.send(text.into()).is_ok())
    }

    /// Closes the current connection from the server side.
    pub fn drop_connection(&self) {
        lock(&self.state).server = None;
    }
}

#[async_trait]
impl PushConnector for MockPushConnector {
    async fn connect(&self) -> TransportResult<Box<dyn PushConnection>> {
        let mut state = lock(&self.state);
        state.attempts += 1;
        if state.refusals > 0 {
            state.refusals -= 1;
            return Err(TransportError::Push("connection refused".to_string()));
        }

        let (server, inbox) = mpsc::unbounded_channel();
        state.server = Some(server);
        Ok(Box::new(MockPushConnection {
            inbox,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockPushConnection {
    inbox: mpsc::UnboundedReceiver<String>,
    state: Arc<Mutex<PushScript>>,
}

#[async_trait]
impl PushConnection for MockPushConnection {
    async fn send_text(&mut self, text: String) -> TransportResult<()> {
        let message: ClientPush = serde_json::from_str(&text)?;
        lock(&self.state).sent.push(message);
        Ok(())
    }

    async fn next_text(&mut self) -> Option<TransportResult<String>> {
        self.inbox.recv().await.map(Ok)
    }
}
