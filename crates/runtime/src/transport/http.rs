//! `reqwest` implementation of [`BattleApi`].
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use battle_protocol::{
    ActionRequest, AutoRoundRequest, CharacterStats, DamageEntry, GameId, GameRecord, OverallStats,
    PlayerStanding, ReplayEvent, RoundsEntry, StartBattleRequest, StartBattleResponse,
    StartedBattle,
};

use super::{BattleApi, TransportError, TransportResult};

/// Acknowledgement of fire-and-forget round requests. Any `error` field
/// turns into [`TransportError::Rejected`].
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Ack {
    error: Option<String>,
}

/// HTTP client for the battle backend.
#[derive(Clone)]
pub struct HttpBattleApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBattleApi {
    /// Creates a client rooted at `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TransportResult<T> {
        debug!(target: "runtime::http", path, "GET");
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TransportResult<T> {
        debug!(target: "runtime::http", path, "POST");
        let response = self.http_client.post(self.url(path)).json(body).send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> TransportResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(target: "runtime::http", path, status = status.as_u16(), "request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|err| {
            TransportError::Decode(format!("{path}: {err}"))
        })
    }

    /// Fire-and-acknowledge POST. A body that is not an [`Ack`] counts as
    /// success; only an explicit `error` field is a refusal.
    async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> TransportResult<()> {
        debug!(target: "runtime::http", path, "POST");
        let response = self.http_client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str::<Ack>(&text) {
            Ok(Ack { error: Some(error) }) => Err(TransportError::Rejected(error)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl BattleApi for HttpBattleApi {
    async fn start_battle(&self, request: &StartBattleRequest) -> TransportResult<StartedBattle> {
        let response: StartBattleResponse = self.post_json("/battle/start", request).await?;
        response.into_started().map_err(TransportError::Rejected)
    }

    async fn send_action(&self, request: ActionRequest) -> TransportResult<()> {
        self.post_ack("/battle/action", &request).await
    }

    async fn request_auto_round(&self, request: AutoRoundRequest) -> TransportResult<()> {
        self.post_ack("/battle/auto", &request).await
    }

    async fn overall_stats(&self) -> TransportResult<OverallStats> {
        self.get_json("/stats").await
    }

    async fn character_stats(&self) -> TransportResult<CharacterStats> {
        self.get_json("/stats/characters").await
    }

    async fn recent_games(&self) -> TransportResult<Vec<GameRecord>> {
        self.get_json("/games/recent").await
    }

    async fn all_games(&self) -> TransportResult<Vec<GameRecord>> {
        self.get_json("/games/all").await
    }

    async fn game(&self, game_id: GameId) -> TransportResult<GameRecord> {
        self.get_json(&format!("/games/{}", game_id.0)).await
    }

    async fn replay(&self, game_id: GameId) -> TransportResult<Vec<ReplayEvent>> {
        self.get_json(&format!("/games/{}/replay", game_id.0)).await
    }

    async fn damage_leaderboard(&self) -> TransportResult<Vec<DamageEntry>> {
        self.get_json("/leaderboard").await
    }

    async fn rounds_leaderboard(&self) -> TransportResult<Vec<RoundsEntry>> {
        self.get_json("/leaderboard/rounds").await
    }

    async fn player_leaderboard(&self) -> TransportResult<Vec<PlayerStanding>> {
        self.get_json("/leaderboard/players").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let api = HttpBattleApi::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(api.url("/stats"), "http://localhost:5000/stats");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let api = HttpBattleApi::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = api.overall_stats().await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
    }
}
