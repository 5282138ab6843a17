//! HTTP request/response bodies and the round payload.
use serde::{Deserialize, Serialize};

use crate::ids::{Difficulty, GameId, SkillId};
use crate::round::RoundResult;

/// `POST /battle/start` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartBattleRequest {
    pub player_name: String,
    pub difficulty: Difficulty,
}

/// `POST /battle/start` reply: `{success, game_id, state}` or `{success: false, error}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StartBattleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RoundResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A battle the backend accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartedBattle {
    pub game_id: GameId,
    pub initial: RoundResult,
}

impl StartBattleResponse {
    pub fn accepted(game_id: GameId, state: RoundResult) -> Self {
        Self {
            success: true,
            game_id: Some(game_id),
            state: Some(state),
            error: None,
        }
    }

    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Collapses the reply into the started battle or the backend's reason.
    pub fn into_started(self) -> Result<StartedBattle, String> {
        match (self.success, self.game_id, self.state) {
            (true, Some(game_id), Some(initial)) => Ok(StartedBattle { game_id, initial }),
            (true, _, _) => Err("start response is missing game id or state".to_string()),
            (false, _, _) => Err(self.error.unwrap_or_else(|| "unknown error".to_string())),
        }
    }
}

/// `POST /battle/action` body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub game_id: GameId,
    pub skill_id: SkillId,
}

/// `POST /battle/auto` body: the backend picks the hero's move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRoundRequest {
    pub game_id: GameId,
}

/// Application-level refusal sent in place of a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRejection {
    pub error: String,
}

/// What a `round_resolved` push carries.
///
/// The rejection arm is tried first: a resolved snapshot never has an
/// `error` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundPayload {
    Rejected(RoundRejection),
    Resolved(RoundResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_start_keeps_backend_reason() {
        let raw = r#"{"success": false, "error": "server busy"}"#;
        let response: StartBattleResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_started(), Err("server busy".to_string()));
    }

    #[test]
    fn accepted_start_without_state_is_an_error() {
        let raw = r#"{"success": true, "game_id": 4}"#;
        let response: StartBattleResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_started().is_err());
    }

    #[test]
    fn error_payload_wins_over_embedded_state() {
        let raw = r#"{"error": "skill on cooldown",
            "state": {"round": 2, "dragon": {"hp": 5}, "person": {"hp": 5}}}"#;
        let payload: RoundPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(
            payload,
            RoundPayload::Rejected(RoundRejection {
                error: "skill on cooldown".to_string()
            })
        );
    }

    #[test]
    fn action_body_uses_numeric_ids() {
        let body = ActionRequest {
            game_id: GameId(12),
            skill_id: SkillId::ULTIMATE,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"game_id":12,"skill_id":3}"#
        );
    }
}
