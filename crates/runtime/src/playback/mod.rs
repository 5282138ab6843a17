//! Turn playback synchronizer.
//!
//! Replays the ordered [`TurnEvent`](battle_protocol::TurnEvent)s of a
//! [`RoundResult`] as paced, visible steps and then snaps the display to the
//! round's authoritative state. Each step is a [`PlaybackTask`] on the session
//! timeline; the synchronizer itself only reacts to tasks that come due and
//! reports what to render plus what the session worker should do next.
//!
//! Phases per round: `Idle -> PlayingEvent(0) -> .. -> PlayingEvent(n-1) ->
//! Reconciled`. A newer round arriving mid-playback cancels the remaining
//! steps and starts over from the new result; tasks of the old round are
//! recognised by their stale generation.
mod pacing;

pub use pacing::{PacingConfig, PacingProfile};

use tracing::{debug, trace};

use battle_protocol::{Cooldowns, RoundResult, Side, Winner};

use crate::events::PlaybackEvent;
use crate::scheduler::{Scheduled, SessionTimeline, Task};
use crate::session::{SessionState, SessionToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    PlayingEvent { index: usize },
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    /// Show the actor of event `i`.
    Reveal(usize),
    /// Apply event `i` to the displayed HP.
    Land(usize),
    /// Critical marker of event `i`.
    Critical(usize),
    /// Snap to the authoritative snapshot.
    Reconcile,
    /// Dismiss the battle view after the final round.
    TearDown,
}

/// A playback step bound to the round generation that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTask {
    pub generation: u64,
    pub step: PlaybackStep,
}

/// Follow-up work for the session worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// The round is on screen; the gate may admit the next request.
    ReleaseGate { cooldowns: Cooldowns },
    /// Auto mode should schedule the next round request.
    ContinueAuto,
    /// The end-of-battle delay elapsed.
    TearDown,
}

#[derive(Debug, Default)]
pub struct Output {
    pub events: Vec<PlaybackEvent>,
    pub directives: Vec<Directive>,
}

impl Output {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.directives.is_empty()
    }
}

/// What is currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub dragon_hp: u32,
    pub person_hp: u32,
    pub dragon_max_hp: Option<u32>,
    pub person_max_hp: Option<u32>,
    pub cooldowns: Cooldowns,
    pub round: u32,
    pub winner: Option<Winner>,
}

impl DisplayState {
    pub fn hp(&self, side: Side) -> u32 {
        match side {
            Side::Dragon => self.dragon_hp,
            Side::Person => self.person_hp,
        }
    }

    pub fn max_hp(&self, side: Side) -> Option<u32> {
        match side {
            Side::Dragon => self.dragon_max_hp,
            Side::Person => self.person_max_hp,
        }
    }

    fn set_hp(&mut self, side: Side, hp: u32) {
        match side {
            Side::Dragon => self.dragon_hp = hp,
            Side::Person => self.person_hp = hp,
        }
    }

    fn adopt_max_hp(&mut self, result: &RoundResult) {
        self.dragon_max_hp = result.dragon_max_hp.or(self.dragon_max_hp);
        self.person_max_hp = result.person_max_hp.or(self.person_max_hp);
    }
}

pub struct Synchronizer {
    phase: PlaybackPhase,
    generation: u64,
    round: Option<RoundResult>,
    display: DisplayState,
    pacing: PacingProfile,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            generation: 0,
            round: None,
            display: DisplayState::default(),
            pacing: PacingProfile::manual(),
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, PlaybackPhase::PlayingEvent { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Displays a snapshot directly, without playback (battle start).
    pub fn prime(&mut self, initial: &RoundResult) -> Vec<PlaybackEvent> {
        self.generation += 1;
        self.phase = PlaybackPhase::Idle;
        self.round = None;
        self.display = DisplayState {
            round: initial.round,
            ..DisplayState::default()
        };
        self.display.adopt_max_hp(initial);

        let mut events = self.snap_hp(initial);
        self.display.cooldowns = initial.cooldowns.clone();
        events.push(PlaybackEvent::CooldownsUpdated {
            cooldowns: initial.cooldowns.clone(),
        });
        events
    }

    /// Starts playback of `result`, preempting whatever round was playing.
    pub fn begin(
        &mut self,
        result: RoundResult,
        session: &SessionState,
        pacing: &PacingConfig,
        timeline: &mut SessionTimeline,
    ) -> Output {
        let token = session.token();
        let cancelled = timeline.cancel_where(|task| task.session == token && task.is_playback());
        if self.is_playing() {
            debug!(
                target: "runtime::playback",
                round = result.round,
                cancelled,
                "playback preempted by a newer round"
            );
        }

        self.generation += 1;
        self.pacing = *pacing.profile(session.is_auto_mode());
        self.display.adopt_max_hp(&result);

        let mut out = Output::default();
        out.events.push(PlaybackEvent::StatusCleared);

        let has_events = !result.events.is_empty();
        debug!(
            target: "runtime::playback",
            round = result.round,
            events = result.events.len(),
            auto = session.is_auto_mode(),
            "round playback started"
        );
        self.round = Some(result);

        if has_events {
            self.reveal(0, token, timeline, &mut out);
        } else {
            self.reconcile(session, timeline, &mut out);
        }
        out
    }

    /// Runs a playback step that came due.
    pub fn advance(
        &mut self,
        task: PlaybackTask,
        session: &SessionState,
        timeline: &mut SessionTimeline,
    ) -> Output {
        let mut out = Output::default();
        if task.generation != self.generation {
            trace!(target: "runtime::playback", ?task, "stale playback step dropped");
            return out;
        }

        let token = session.token();
        match task.step {
            PlaybackStep::Reveal(index) => self.reveal(index, token, timeline, &mut out),
            PlaybackStep::Land(index) => self.land(index, token, timeline, &mut out),
            PlaybackStep::Critical(index) => {
                if let Some(event) = self.event(index) {
                    out.events.push(PlaybackEvent::CriticalShown {
                        target: event.target,
                    });
                }
            }
            PlaybackStep::Reconcile => self.reconcile(session, timeline, &mut out),
            PlaybackStep::TearDown => {
                self.phase = PlaybackPhase::Idle;
                self.round = None;
                out.directives.push(Directive::TearDown);
            }
        }
        out
    }

    /// Drops the current round and invalidates every scheduled step.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = PlaybackPhase::Idle;
        self.round = None;
        self.display = DisplayState::default();
    }

    fn event(&self, index: usize) -> Option<battle_protocol::TurnEvent> {
        self.round
            .as_ref()
            .and_then(|round| round.events.get(index))
            .copied()
    }

    fn schedule(
        &self,
        timeline: &mut SessionTimeline,
        token: SessionToken,
        delay: std::time::Duration,
        step: PlaybackStep,
    ) {
        let task = PlaybackTask {
            generation: self.generation,
            step,
        };
        timeline.schedule(delay, Scheduled::new(token, Task::Playback(task)));
    }

    fn reveal(
        &mut self,
        index: usize,
        token: SessionToken,
        timeline: &mut SessionTimeline,
        out: &mut Output,
    ) {
        let Some(event) = self.event(index) else {
            return;
        };
        self.phase = PlaybackPhase::PlayingEvent { index };
        out.events.push(PlaybackEvent::ActorActing {
            actor: event.actor(),
            index,
        });
        self.schedule(
            timeline,
            token,
            self.pacing.actor_reveal,
            PlaybackStep::Land(index),
        );
    }

    fn land(
        &mut self,
        index: usize,
        token: SessionToken,
        timeline: &mut SessionTimeline,
        out: &mut Output,
    ) {
        let Some(event) = self.event(index) else {
            return;
        };
        let target = event.target;
        let max_hp = self.display.max_hp(target);
        let hp = event.apply_to(self.display.hp(target), max_hp);
        self.display.set_hp(target, hp);

        out.events.push(PlaybackEvent::EffectApplied {
            index,
            target,
            kind: event.kind,
            value: event.value,
            critical: event.is_critical,
        });
        out.events.push(PlaybackEvent::HpDisplayed {
            side: target,
            hp,
            max_hp,
            authoritative: false,
        });
        out.events.push(PlaybackEvent::FloatingDelta {
            target,
            kind: event.kind,
            value: event.value,
        });

        if event.is_critical {
            self.schedule(
                timeline,
                token,
                self.pacing.critical_delay,
                PlaybackStep::Critical(index),
            );
        }

        let total = self.round.as_ref().map_or(0, |round| round.events.len());
        let next = if index + 1 < total {
            PlaybackStep::Reveal(index + 1)
        } else {
            PlaybackStep::Reconcile
        };
        self.schedule(timeline, token, self.pacing.inter_event, next);
    }

    fn reconcile(&mut self, session: &SessionState, timeline: &mut SessionTimeline, out: &mut Output) {
        let Some(result) = self.round.clone() else {
            return;
        };

        out.events.extend(self.snap_hp(&result));
        self.display.cooldowns = result.cooldowns.clone();
        self.display.round = result.round;
        out.events.push(PlaybackEvent::CooldownsUpdated {
            cooldowns: result.cooldowns.clone(),
        });

        self.phase = PlaybackPhase::Reconciled;
        out.events.push(PlaybackEvent::Reconciled {
            round: result.round,
        });
        out.directives.push(Directive::ReleaseGate {
            cooldowns: result.cooldowns,
        });

        if result.game_over {
            self.display.winner = result.winner;
            if let Some(winner) = result.winner {
                out.events.push(PlaybackEvent::WinnerShown { winner });
            }
            self.schedule(
                timeline,
                session.token(),
                self.pacing.teardown_delay,
                PlaybackStep::TearDown,
            );
        } else if session.is_auto_mode() {
            out.directives.push(Directive::ContinueAuto);
        }
        debug!(
            target: "runtime::playback",
            round = result.round,
            game_over = result.game_over,
            "round reconciled"
        );
    }

    fn snap_hp(&mut self, result: &RoundResult) -> Vec<PlaybackEvent> {
        [Side::Dragon, Side::Person]
            .into_iter()
            .map(|side| {
                let hp = result.hp(side);
                self.display.set_hp(side, hp);
                PlaybackEvent::HpDisplayed {
                    side,
                    hp,
                    max_hp: self.display.max_hp(side),
                    authoritative: true,
                }
            })
            .collect()
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}
