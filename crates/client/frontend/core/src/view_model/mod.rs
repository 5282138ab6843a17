//! View-model layer for presentation.
//!
//! This module provides a stateful ViewModel that is incrementally updated
//! as runtime events arrive. Widgets read it; only
//! [`ViewModelUpdater`](crate::services::ViewModelUpdater) and the event loop
//! write it.

pub mod battle;
pub mod presentation;
pub mod stats;

use std::time::Instant;

use runtime::{ControlState, Notice};

use crate::achievements::AchievementSet;

pub use battle::{BattleView, FighterView, FloatingText};
pub use presentation::PresentationMapper;
pub use stats::{ConnectionView, HistoryView, LeaderboardView, StatsView};

/// Stateful ViewModel owned by the event loop.
#[derive(Clone, Debug, Default)]
pub struct ViewModel {
    /// Battle on screen; `None` before the first start and after teardown.
    pub battle: Option<BattleView>,

    /// Skill button enablement, mirrored from the input gate.
    pub controls: ControlState,

    pub connection: ConnectionView,

    pub stats: StatsView,

    pub history: HistoryView,

    pub leaderboards: LeaderboardView,

    pub achievements: AchievementSet,

    /// Banner currently shown, with its expiry.
    pub notice: Option<ActiveNotice>,
}

#[derive(Clone, Debug)]
pub struct ActiveNotice {
    pub notice: Notice,
    pub expires_at: Instant,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_battle(&self) -> bool {
        self.battle.is_some()
    }

    /// Whether the battle on screen is over (winner shown, teardown pending).
    pub fn battle_ended(&self) -> bool {
        self.battle.as_ref().is_some_and(|battle| battle.ended)
    }
}
