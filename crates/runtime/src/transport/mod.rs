//! Transport layer: request/response calls and the push channel.
//!
//! [`BattleApi`] covers every HTTP interaction with the battle backend and is
//! object-safe so the runtime can hold it as `Arc<dyn BattleApi>`. Round
//! outcomes never come back on the HTTP path; they arrive on the push channel
//! (see [`push`]).
mod http;
pub mod mock;
pub mod push;
pub(crate) mod polling;

pub use http::HttpBattleApi;
pub use push::{PushConfig, PushConnection, PushConnector, WsConnector};

use async_trait::async_trait;
use thiserror::Error;

use battle_protocol::{
    ActionRequest, AutoRoundRequest, CharacterStats, DamageEntry, GameId, GameRecord, OverallStats,
    PlayerStanding, ReplayEvent, RoundsEntry, StartBattleRequest, StartedBattle,
};

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Failures talking to the backend.
///
/// String payloads keep the error `Clone` so it can travel inside events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    /// The backend understood the request and refused it.
    #[error("{0}")]
    Rejected(String),

    #[error("push channel error: {0}")]
    Push(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// HTTP surface of the battle backend.
#[async_trait]
pub trait BattleApi: Send + Sync {
    /// `POST /battle/start`. A refusal is [`TransportError::Rejected`].
    async fn start_battle(&self, request: &StartBattleRequest) -> TransportResult<StartedBattle>;

    /// `POST /battle/action`. The round result arrives on the push channel.
    async fn send_action(&self, request: ActionRequest) -> TransportResult<()>;

    /// `POST /battle/auto`. The backend picks the hero's move.
    async fn request_auto_round(&self, request: AutoRoundRequest) -> TransportResult<()>;

    async fn overall_stats(&self) -> TransportResult<OverallStats>;

    async fn character_stats(&self) -> TransportResult<CharacterStats>;

    async fn recent_games(&self) -> TransportResult<Vec<GameRecord>>;

    async fn all_games(&self) -> TransportResult<Vec<GameRecord>>;

    async fn game(&self, game_id: GameId) -> TransportResult<GameRecord>;

    async fn replay(&self, game_id: GameId) -> TransportResult<Vec<ReplayEvent>>;

    async fn damage_leaderboard(&self) -> TransportResult<Vec<DamageEntry>>;

    async fn rounds_leaderboard(&self) -> TransportResult<Vec<RoundsEntry>>;

    async fn player_leaderboard(&self) -> TransportResult<Vec<PlayerStanding>>;
}
