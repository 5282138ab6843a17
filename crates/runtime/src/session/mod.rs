//! Per-battle client state.
//!
//! A [`SessionState`] exists from a successful battle start until the battle
//! is closed or torn down. Only the session worker owns it; the pending-action
//! flag in particular is touched exclusively through [`InputGate`].
mod gate;

pub use gate::{ControlState, GateDecision, GateRejection, InputGate};

use serde::{Deserialize, Serialize};

use battle_protocol::{Difficulty, GameId};

/// Identity of one session instance.
///
/// Every deferred task and in-flight request carries the token of the session
/// that created it; work whose token no longer matches is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionToken(u64);

impl SessionToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Mutable client state of the active battle.
#[derive(Clone, Debug)]
pub struct SessionState {
    token: SessionToken,
    game_id: GameId,
    player_name: String,
    difficulty: Difficulty,
    is_auto_mode: bool,
    is_action_pending: bool,
    current_round: u32,
    finished: bool,
}

impl SessionState {
    pub(crate) fn new(
        token: SessionToken,
        game_id: GameId,
        player_name: String,
        difficulty: Difficulty,
        is_auto_mode: bool,
        current_round: u32,
    ) -> Self {
        Self {
            token,
            game_id,
            player_name,
            difficulty,
            is_auto_mode,
            is_action_pending: false,
            current_round,
            finished: false,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_auto_mode(&self) -> bool {
        self.is_auto_mode
    }

    pub fn is_action_pending(&self) -> bool {
        self.is_action_pending
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// True once a round with `game_over` has been received.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn set_auto_mode(&mut self, enabled: bool) {
        self.is_auto_mode = enabled;
    }

    pub(crate) fn record_round(&mut self, round: u32, game_over: bool) {
        self.current_round = round;
        if game_over {
            self.finished = true;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_id: self.game_id,
            player_name: self.player_name.clone(),
            difficulty: self.difficulty,
            is_auto_mode: self.is_auto_mode,
            is_action_pending: self.is_action_pending,
            current_round: self.current_round,
            finished: self.finished,
        }
    }
}

/// Read-only copy of [`SessionState`] handed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub game_id: GameId,
    pub player_name: String,
    pub difficulty: Difficulty,
    pub is_auto_mode: bool,
    pub is_action_pending: bool,
    pub current_round: u32,
    pub finished: bool,
}
