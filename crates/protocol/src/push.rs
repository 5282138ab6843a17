//! Push-channel envelopes: `{"event": <name>, "data": <payload>}`.
use serde::{Deserialize, Serialize};

use crate::api::RoundPayload;
use crate::ids::GameId;
use crate::stats::GameRecord;

/// Server → client messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerPush {
    /// The backend resolved a round of the subscribed battle (or refused the
    /// action that should have resolved it).
    RoundResolved(RoundPayload),
    /// Some battle, possibly another player's, just finished.
    GameFinished(GameRecord),
    /// Greeting sent right after the socket opens.
    ConnectionResponse(ConnectionAck),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionAck {
    pub status: String,
}

/// Client → server messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientPush {
    /// Route round results of `game_id` to this connection.
    Subscribe { game_id: GameId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::RoundResult;

    #[test]
    fn round_resolved_envelope_decodes() {
        let raw = r#"{"event": "round_resolved", "data": {
            "round": 2, "game_over": false,
            "dragon": {"hp": 15}, "person": {"hp": 18, "cooldowns": {"3": 1}}
        }}"#;

        match serde_json::from_str::<ServerPush>(raw).unwrap() {
            ServerPush::RoundResolved(RoundPayload::Resolved(result)) => {
                assert_eq!(result, {
                    let mut expected = RoundResult::new(2, 15, 18);
                    expected.cooldowns.set(crate::SkillId::ULTIMATE, 1);
                    expected
                });
            }
            other => panic!("unexpected push: {other:?}"),
        }
    }

    #[test]
    fn subscribe_encodes_with_envelope() {
        let json = serde_json::to_string(&ClientPush::Subscribe { game_id: GameId(5) }).unwrap();
        assert_eq!(json, r#"{"event":"subscribe","data":{"game_id":5}}"#);
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(serde_json::from_str::<ServerPush>(r#"{"event": "chat", "data": {}}"#).is_err());
    }
}
