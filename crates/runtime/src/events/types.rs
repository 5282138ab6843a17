//! Event types for different topics.

use serde::{Deserialize, Serialize};

use battle_protocol::{
    CharacterStats, Cooldowns, Difficulty, EffectKind, GameId, GameRecord, OverallStats, Side,
    SkillId, Winner,
};

use crate::session::{ControlState, GateRejection};

/// One visible step of round playback, in the order it must be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback of a new round started; drop leftover status text.
    StatusCleared,

    /// `actor` is shown acting (before its effect lands).
    ActorActing { actor: Side, index: usize },

    /// An effect landed on `target`.
    EffectApplied {
        index: usize,
        target: Side,
        kind: EffectKind,
        value: u32,
        critical: bool,
    },

    /// Transient "-N"/"+N" marker above `target`.
    FloatingDelta {
        target: Side,
        kind: EffectKind,
        value: u32,
    },

    /// Critical-hit marker above `target`, shown shortly after the hit.
    CriticalShown { target: Side },

    /// HP to display for `side`. Interim values come from applying events;
    /// authoritative values come from the round snapshot.
    HpDisplayed {
        side: Side,
        hp: u32,
        max_hp: Option<u32>,
        authoritative: bool,
    },

    /// Cooldown indicators after reconciliation.
    CooldownsUpdated { cooldowns: Cooldowns },

    /// The round's authoritative state is on screen.
    Reconciled { round: u32 },

    /// The battle ended.
    WinnerShown { winner: Winner },
}

/// Session lifecycle, control enablement and user-facing notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A battle started and its initial state is displayed.
    Started {
        game_id: GameId,
        player_name: String,
        difficulty: Difficulty,
        auto_mode: bool,
        round: u32,
    },

    /// The backend refused or failed to start a battle.
    StartFailed { error: String },

    /// A manual action passed the gate and was sent.
    ActionSent { game_id: GameId, skill: SkillId },

    /// A submission was refused by the gate.
    ActionRejected { skill: SkillId, reason: GateRejection },

    /// Auto mode asked the backend for the next round.
    AutoRoundRequested { game_id: GameId },

    /// The round request failed before a result came back.
    RequestFailed { game_id: GameId, error: String },

    /// The backend refused the round (e.g. skill on cooldown).
    RoundRejected { game_id: GameId, error: String },

    ControlsChanged(ControlState),

    AutoModeChanged { enabled: bool },

    /// The final round arrived; playback is still running.
    Ended {
        game_id: GameId,
        winner: Option<Winner>,
    },

    /// The battle view was dismissed after the end-of-battle delay.
    TornDown { game_id: GameId },

    /// The battle was closed explicitly.
    Closed { game_id: GameId },

    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Short message meant to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }
}

/// Push channel health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionEvent {
    Connected,
    Disconnected { reason: String },
    /// A connection attempt failed; `attempt` counts consecutive failures.
    ConnectionFailed { attempt: u32, error: String },
    /// Reconnection gave up; statistics are now polled over HTTP.
    PollingEnabled,
}

/// Refreshed read-only data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatsEvent {
    Overview(OverallStats),
    Characters(CharacterStats),
    RecentGames(Vec<GameRecord>),
    /// Some battle finished, as announced on the push channel.
    GameFinished(GameRecord),
}
