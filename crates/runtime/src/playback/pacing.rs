//! Animation pacing.
use std::time::Duration;

/// Delays used while playing back one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingProfile {
    /// From "actor acting" to the effect landing.
    pub actor_reveal: Duration,
    /// From an effect landing to the next event (or to reconciliation).
    pub inter_event: Duration,
    /// From a critical hit landing to its marker.
    pub critical_delay: Duration,
    /// From the winner being shown to the battle view being dismissed.
    pub teardown_delay: Duration,
    /// From reconciliation to the next auto-mode request.
    pub auto_continue: Duration,
}

impl PacingProfile {
    pub const fn manual() -> Self {
        Self {
            actor_reveal: Duration::from_millis(400),
            inter_event: Duration::from_millis(300),
            critical_delay: Duration::from_millis(100),
            teardown_delay: Duration::from_millis(3000),
            auto_continue: Duration::from_millis(1000),
        }
    }

    /// Faster profile used while auto mode drives the battle.
    pub const fn auto() -> Self {
        Self {
            actor_reveal: Duration::from_millis(150),
            inter_event: Duration::from_millis(150),
            critical_delay: Duration::from_millis(100),
            teardown_delay: Duration::from_millis(3000),
            auto_continue: Duration::from_millis(1000),
        }
    }

    /// Time from the start of playback until reconciliation for `events` events.
    pub fn playback_length(&self, events: usize) -> Duration {
        (self.actor_reveal + self.inter_event) * events as u32
    }
}

/// Manual and auto profiles; the one in effect is chosen when a round starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub manual: PacingProfile,
    pub auto: PacingProfile,
}

impl PacingConfig {
    pub fn profile(&self, auto_mode: bool) -> &PacingProfile {
        if auto_mode { &self.auto } else { &self.manual }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            manual: PacingProfile::manual(),
            auto: PacingProfile::auto(),
        }
    }
}
