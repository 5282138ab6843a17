//! Optional side effects a frontend can attach to battle milestones.
//!
//! Every method has a no-op default, so an implementation only overrides what
//! it supports (a terminal bell, a desktop notification, nothing at all).
use battle_protocol::{OverallStats, Winner};
use runtime::Notice;

use crate::achievements::Achievement;

pub trait SessionHooks: Send {
    fn on_notice(&mut self, _notice: &Notice) {}

    fn on_stats_refreshed(&mut self, _stats: &OverallStats) {}

    fn on_battle_finished(&mut self, _winner: Option<Winner>) {}

    fn on_achievement(&mut self, _achievement: Achievement) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}
