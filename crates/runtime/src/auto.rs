//! Auto-mode driver.
//!
//! Keeps at most one pending "request the next round" timer per session. The
//! timer is armed after a round has been reconciled while auto mode is on, and
//! disarmed when auto mode is switched off, the battle ends, or the session is
//! closed.
use std::time::Duration;

use tracing::debug;

use crate::scheduler::{Scheduled, SessionTimeline, Task, TaskId};
use crate::session::SessionState;

#[derive(Debug, Default)]
pub struct AutoDriver {
    pending: Option<TaskId>,
}

impl AutoDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Arms the continuation timer. Returns false when a timer is already
    /// pending or the session cannot continue.
    pub fn schedule(
        &mut self,
        timeline: &mut SessionTimeline,
        session: &SessionState,
        delay: Duration,
    ) -> bool {
        if self.pending.is_some() || !session.is_auto_mode() || session.is_finished() {
            return false;
        }
        let id = timeline.schedule(delay, Scheduled::new(session.token(), Task::AutoContinue));
        self.pending = Some(id);
        debug!(target: "runtime::session", ?delay, "auto continuation armed");
        true
    }

    /// Disarms the pending timer, if any.
    pub fn cancel(&mut self, timeline: &mut SessionTimeline) -> bool {
        match self.pending.take() {
            Some(id) => timeline.cancel(id),
            None => false,
        }
    }

    /// Marks the pending timer as consumed after it fired.
    pub fn fired(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use battle_protocol::{Difficulty, GameId};

    use super::*;
    use crate::session::SessionToken;

    fn session(auto: bool) -> SessionState {
        SessionState::new(
            SessionToken::new(1),
            GameId(1),
            "Ari".to_string(),
            Difficulty::Easy,
            auto,
            1,
        )
    }

    #[test]
    fn only_one_timer_is_ever_pending() {
        let mut timeline = SessionTimeline::new();
        let mut driver = AutoDriver::new();
        let session = session(true);

        assert!(driver.schedule(&mut timeline, &session, Duration::from_secs(1)));
        assert!(!driver.schedule(&mut timeline, &session, Duration::from_secs(1)));
        assert_eq!(timeline.len(), 1);

        driver.fired();
        assert!(driver.schedule(&mut timeline, &session, Duration::from_secs(1)));
    }

    #[test]
    fn manual_or_finished_sessions_never_arm() {
        let mut timeline = SessionTimeline::new();
        let mut driver = AutoDriver::new();

        assert!(!driver.schedule(&mut timeline, &session(false), Duration::ZERO));

        let mut finished = session(true);
        finished.record_round(3, true);
        assert!(!driver.schedule(&mut timeline, &finished, Duration::ZERO));
        assert!(timeline.is_empty());
    }

    #[test]
    fn cancel_removes_the_timer() {
        let mut timeline = SessionTimeline::new();
        let mut driver = AutoDriver::new();
        driver.schedule(&mut timeline, &session(true), Duration::from_millis(10));

        assert!(driver.cancel(&mut timeline));
        assert!(!driver.cancel(&mut timeline));
        assert!(timeline.is_empty());
        assert!(!driver.is_pending());
    }
}
