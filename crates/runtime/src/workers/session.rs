//! Session worker that owns the active battle.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), inbound
//! push traffic, completions of spawned HTTP requests and timeline deadlines,
//! and handles them strictly one at a time. Nothing else mutates session
//! state, so ordering between playback, the gate and auto mode follows from
//! the order inputs are processed here.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use battle_protocol::{
    ActionRequest, AutoRoundRequest, ClientPush, Difficulty, GameId, RoundPayload, RoundRejection,
    RoundResult, ServerPush, SkillId, StartBattleRequest, StartedBattle,
};

use crate::api::{Result, RuntimeError};
use crate::auto::AutoDriver;
use crate::events::{ConnectionEvent, EventBus, Notice, SessionEvent, StatsEvent};
use crate::playback::{Directive, Output, PacingConfig, Synchronizer};
use crate::scheduler::{SessionTimeline, Task};
use crate::session::{GateDecision, InputGate, SessionSnapshot, SessionState, SessionToken};
use crate::transport::polling::{refresh_stats, run_polling};
use crate::transport::push::PushInbound;
use crate::transport::{BattleApi, TransportError, TransportResult};

/// Commands that can be sent to the session worker
pub enum Command {
    StartBattle {
        player_name: String,
        difficulty: Difficulty,
        auto_mode: bool,
        reply: oneshot::Sender<Result<GameId>>,
    },
    Submit {
        skill: SkillId,
        reply: oneshot::Sender<GateDecision>,
    },
    SetAutoMode {
        enabled: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Closes the active battle. Replies whether one was open.
    CloseBattle { reply: oneshot::Sender<bool> },
    QuerySession {
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
    RefreshStats,
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub pacing: PacingConfig,
    pub polling_interval: Duration,
}

struct PendingStart {
    player_name: String,
    difficulty: Difficulty,
    auto_mode: bool,
    reply: oneshot::Sender<Result<GameId>>,
}

#[derive(Debug, Clone, Copy)]
enum RoundRequest {
    Action(ActionRequest),
    Auto(AutoRoundRequest),
}

impl RoundRequest {
    fn is_auto(&self) -> bool {
        matches!(self, RoundRequest::Auto(_))
    }
}

/// Results of work spawned off the worker.
enum Completion {
    Started {
        result: TransportResult<StartedBattle>,
        pending: PendingStart,
    },
    RequestFailed {
        session: SessionToken,
        request_id: u64,
        request: RoundRequest,
        error: TransportError,
    },
}

pub struct SessionWorker {
    api: Arc<dyn BattleApi>,
    event_bus: EventBus,
    config: WorkerConfig,

    command_rx: mpsc::Receiver<Command>,
    inbound_rx: Option<mpsc::Receiver<PushInbound>>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    subscribe_tx: mpsc::UnboundedSender<ClientPush>,

    origin: Instant,
    timeline: SessionTimeline,
    session: Option<SessionState>,
    gate: InputGate,
    sync: Synchronizer,
    auto: AutoDriver,

    next_token: u64,
    next_request_id: u64,
    /// Id of the round request currently holding the gate.
    outstanding: Option<u64>,
    start_in_flight: bool,
    polling: Option<JoinHandle<()>>,
}

impl SessionWorker {
    pub fn new(
        api: Arc<dyn BattleApi>,
        event_bus: EventBus,
        config: WorkerConfig,
        command_rx: mpsc::Receiver<Command>,
        inbound_rx: mpsc::Receiver<PushInbound>,
        subscribe_tx: mpsc::UnboundedSender<ClientPush>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            api,
            event_bus,
            config,
            command_rx,
            inbound_rx: Some(inbound_rx),
            completion_tx,
            completion_rx,
            subscribe_tx,
            origin: Instant::now(),
            timeline: SessionTimeline::new(),
            session: None,
            gate: InputGate::new(),
            sync: Synchronizer::new(),
            auto: AutoDriver::new(),
            next_token: 0,
            next_request_id: 0,
            outstanding: None,
            start_in_flight: false,
            polling: None,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            let deadline = self.timeline.next_due().map(|due| self.origin + due);
            let wake_at = deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                inbound = recv_inbound(&mut self.inbound_rx) => match inbound {
                    Some(inbound) => self.handle_inbound(inbound),
                    None => {
                        debug!(target: "runtime::session", "push channel closed");
                        self.inbound_rx = None;
                    }
                },
                Some(completion) = self.completion_rx.recv() => self.handle_completion(completion),
                _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => self.fire_due(),
            }
        }

        if let Some(polling) = self.polling.take() {
            polling.abort();
        }
        debug!(target: "runtime::session", "session worker stopped");
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::StartBattle {
                player_name,
                difficulty,
                auto_mode,
                reply,
            } => self.start_battle(PendingStart {
                player_name,
                difficulty,
                auto_mode,
                reply,
            }),
            Command::Submit { skill, reply } => {
                let decision = self.submit(skill);
                if reply.send(decision).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::SetAutoMode { enabled, reply } => {
                let result = self.set_auto_mode(enabled);
                if reply.send(result).is_err() {
                    debug!("SetAutoMode reply channel closed (caller dropped)");
                }
            }
            Command::CloseBattle { reply } => {
                let closed = match self.close_session() {
                    Some(game_id) => {
                        self.event_bus.publish(SessionEvent::Closed { game_id });
                        true
                    }
                    None => false,
                };
                if reply.send(closed).is_err() {
                    debug!("CloseBattle reply channel closed (caller dropped)");
                }
            }
            Command::QuerySession { reply } => {
                let snapshot = self.session.as_ref().map(SessionState::snapshot);
                if reply.send(snapshot).is_err() {
                    debug!("QuerySession reply channel closed (caller dropped)");
                }
            }
            Command::RefreshStats => self.spawn_stats_refresh(),
            Command::Shutdown => {}
        }
    }

    fn start_battle(&mut self, pending: PendingStart) {
        if self.start_in_flight {
            if pending.reply.send(Err(RuntimeError::StartInProgress)).is_err() {
                debug!("StartBattle reply channel closed (caller dropped)");
            }
            return;
        }
        self.start_in_flight = true;

        info!(
            target: "runtime::session",
            player = %pending.player_name,
            difficulty = %pending.difficulty,
            auto = pending.auto_mode,
            "starting battle"
        );

        let request = StartBattleRequest {
            player_name: pending.player_name.clone(),
            difficulty: pending.difficulty,
        };
        let api = Arc::clone(&self.api);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = api.start_battle(&request).await;
            if completion_tx
                .send(Completion::Started { result, pending })
                .is_err()
            {
                debug!(target: "runtime::session", "worker gone before start completed");
            }
        });
    }

    fn on_started(&mut self, result: TransportResult<StartedBattle>, pending: PendingStart) {
        self.start_in_flight = false;

        let started = match result {
            Ok(started) => started,
            Err(error) => {
                warn!(target: "runtime::session", %error, "battle start failed");
                self.event_bus.publish(SessionEvent::StartFailed {
                    error: error.to_string(),
                });
                self.event_bus.publish(SessionEvent::Notice(Notice::error(
                    "Could not start battle",
                    error.to_string(),
                )));
                if pending.reply.send(Err(error.into())).is_err() {
                    debug!("StartBattle reply channel closed (caller dropped)");
                }
                return;
            }
        };

        if let Some(previous) = self.close_session() {
            self.event_bus.publish(SessionEvent::Closed { game_id: previous });
        }

        self.next_token += 1;
        let game_id = started.game_id;
        let initial = started.initial;
        let session = SessionState::new(
            SessionToken::new(self.next_token),
            game_id,
            pending.player_name,
            pending.difficulty,
            pending.auto_mode,
            initial.round,
        );

        self.timeline.advance_to(self.elapsed());
        let shown = self.sync.prime(&initial);
        self.gate.reset();
        self.gate.refresh_cooldowns(&initial.cooldowns);
        self.gate.sync_flags(&session);

        self.event_bus.publish(SessionEvent::Started {
            game_id,
            player_name: session.player_name().to_string(),
            difficulty: session.difficulty(),
            auto_mode: session.is_auto_mode(),
            round: initial.round,
        });
        for event in shown {
            self.event_bus.publish(event);
        }
        self.event_bus
            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));

        if self
            .subscribe_tx
            .send(ClientPush::Subscribe { game_id })
            .is_err()
        {
            warn!(target: "runtime::push", %game_id, "push channel not running; round results will not arrive");
        }

        self.auto.schedule(
            &mut self.timeline,
            &session,
            self.config.pacing.auto.auto_continue,
        );
        info!(target: "runtime::session", %game_id, "battle started");
        self.session = Some(session);

        if pending.reply.send(Ok(game_id)).is_err() {
            debug!("StartBattle reply channel closed (caller dropped)");
        }
    }

    fn submit(&mut self, skill: SkillId) -> GateDecision {
        let decision = self.gate.submit(self.session.as_mut(), skill);
        match decision {
            GateDecision::Accepted => {
                let Some(session) = self.session.as_ref() else {
                    return decision;
                };
                let (token, game_id) = (session.token(), session.game_id());
                self.event_bus
                    .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
                self.event_bus
                    .publish(SessionEvent::ActionSent { game_id, skill });
                self.spawn_request(
                    token,
                    RoundRequest::Action(ActionRequest {
                        game_id,
                        skill_id: skill,
                    }),
                );
            }
            GateDecision::Rejected(reason) => {
                self.event_bus
                    .publish(SessionEvent::ActionRejected { skill, reason });
            }
            GateDecision::Ignored => {}
        }
        decision
    }

    fn set_auto_mode(&mut self, enabled: bool) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(RuntimeError::NoActiveSession);
        };
        if session.is_auto_mode() == enabled {
            return Ok(());
        }

        session.set_auto_mode(enabled);
        self.gate.sync_flags(session);
        info!(target: "runtime::session", enabled, "auto mode toggled");

        if enabled {
            // Mid-playback or with a request in flight the reconcile step
            // arms the continuation instead.
            if !self.sync.is_playing() && !session.is_action_pending() {
                self.timeline.advance_to(
                    Instant::now().saturating_duration_since(self.origin),
                );
                self.auto.schedule(
                    &mut self.timeline,
                    session,
                    self.config.pacing.auto.auto_continue,
                );
            }
        } else {
            self.auto.cancel(&mut self.timeline);
        }

        self.event_bus
            .publish(SessionEvent::AutoModeChanged { enabled });
        self.event_bus
            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
        Ok(())
    }

    /// Drops the active session and everything scheduled on its behalf.
    fn close_session(&mut self) -> Option<GameId> {
        let session = self.session.take()?;
        let token = session.token();
        let cancelled = self.timeline.cancel_where(|scheduled| scheduled.session == token);
        self.auto.cancel(&mut self.timeline);
        self.sync.reset();
        self.gate.reset();
        self.outstanding = None;

        info!(
            target: "runtime::session",
            game_id = %session.game_id(),
            cancelled,
            "battle closed"
        );
        Some(session.game_id())
    }

    fn spawn_request(&mut self, session: SessionToken, request: RoundRequest) {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.outstanding = Some(request_id);

        let api = Arc::clone(&self.api);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = match request {
                RoundRequest::Action(action) => api.send_action(action).await,
                RoundRequest::Auto(auto) => api.request_auto_round(auto).await,
            };
            if let Err(error) = result
                && completion_tx
                    .send(Completion::RequestFailed {
                        session,
                        request_id,
                        request,
                        error,
                    })
                    .is_err()
            {
                debug!(target: "runtime::session", "worker gone before request failure was reported");
            }
        });
    }

    fn spawn_stats_refresh(&self) {
        let api = Arc::clone(&self.api);
        let bus = self.event_bus.clone();
        tokio::spawn(async move {
            refresh_stats(api.as_ref(), &bus).await;
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Started { result, pending } => self.on_started(result, pending),
            Completion::RequestFailed {
                session,
                request_id,
                request,
                error,
            } => self.on_request_failed(session, request_id, request, error),
        }
    }

    fn on_request_failed(
        &mut self,
        token: SessionToken,
        request_id: u64,
        request: RoundRequest,
        error: TransportError,
    ) {
        let Some(session) = self.session.as_mut().filter(|s| s.token() == token) else {
            debug!(target: "runtime::session", %error, "failure of a closed session's request dropped");
            return;
        };
        if self.outstanding != Some(request_id) {
            debug!(target: "runtime::session", %error, "failure of a settled request dropped");
            return;
        }
        self.outstanding = None;

        warn!(target: "runtime::session", ?request, %error, "round request failed");
        let game_id = session.game_id();
        self.gate.release(session);

        // A failed auto request would otherwise leave auto mode stalled.
        let stop_auto = request.is_auto() && session.is_auto_mode();
        if stop_auto {
            session.set_auto_mode(false);
            self.auto.cancel(&mut self.timeline);
            self.gate.sync_flags(session);
        }

        self.event_bus.publish(SessionEvent::RequestFailed {
            game_id,
            error: error.to_string(),
        });
        self.event_bus.publish(SessionEvent::Notice(Notice::error(
            "Request failed",
            error.to_string(),
        )));
        if stop_auto {
            self.event_bus
                .publish(SessionEvent::AutoModeChanged { enabled: false });
        }
        self.event_bus
            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));

        // Auto mode switched on while a manual action was in flight.
        self.rearm_auto();
    }

    fn handle_inbound(&mut self, inbound: PushInbound) {
        match inbound {
            PushInbound::Message(ServerPush::RoundResolved(RoundPayload::Resolved(result))) => {
                self.on_round(result)
            }
            PushInbound::Message(ServerPush::RoundResolved(RoundPayload::Rejected(rejection))) => {
                self.on_round_rejected(rejection)
            }
            PushInbound::Message(ServerPush::GameFinished(record)) => {
                debug!(target: "runtime::push", game_id = %record.game_id, "game finished upstream");
                self.event_bus.publish(StatsEvent::GameFinished(record));
                self.spawn_stats_refresh();
            }
            PushInbound::Message(ServerPush::ConnectionResponse(ack)) => {
                debug!(target: "runtime::push", status = %ack.status, "server greeting");
            }
            PushInbound::Connection(event) => {
                let push_lost = matches!(
                    event,
                    ConnectionEvent::Disconnected { .. } | ConnectionEvent::PollingEnabled
                );
                if matches!(event, ConnectionEvent::PollingEnabled) {
                    self.enable_polling();
                }
                self.event_bus.publish(event);
                if push_lost {
                    self.abandon_outstanding();
                }
            }
        }
    }

    /// Releases the gate held by a request whose result can no longer arrive.
    ///
    /// A round already in playback reconciles on its own and is left alone.
    fn abandon_outstanding(&mut self) {
        if self.outstanding.is_none() || self.sync.is_playing() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.outstanding = None;
        if !self.gate.release(session) {
            return;
        }

        warn!(
            target: "runtime::session",
            game_id = %session.game_id(),
            "push channel lost with a round outstanding; gate released"
        );
        self.event_bus.publish(SessionEvent::Notice(Notice::warning(
            "Connection lost",
            "The last round result may not arrive. Controls are available again.",
        )));
        self.event_bus
            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
        self.rearm_auto();
    }

    /// Arms the auto continuation unless a round is still playing back.
    fn rearm_auto(&mut self) {
        if self.sync.is_playing() {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.timeline
            .advance_to(Instant::now().saturating_duration_since(self.origin));
        self.auto.schedule(
            &mut self.timeline,
            session,
            self.config.pacing.auto.auto_continue,
        );
    }

    fn enable_polling(&mut self) {
        if self.polling.is_some() {
            return;
        }
        self.polling = Some(tokio::spawn(run_polling(
            Arc::clone(&self.api),
            self.event_bus.clone(),
            self.config.polling_interval,
        )));
    }

    fn on_round(&mut self, result: RoundResult) {
        let now = self.elapsed();
        let Some(session) = self.session.as_mut() else {
            debug!(target: "runtime::session", round = result.round, "round without an active battle dropped");
            return;
        };
        if let Some(game_id) = result.game_id
            && game_id != session.game_id()
        {
            debug!(target: "runtime::session", %game_id, "round of another battle dropped");
            return;
        }
        if session.is_finished() {
            debug!(target: "runtime::session", round = result.round, "round after game over dropped");
            return;
        }

        session.record_round(result.round, result.game_over);
        if result.game_over {
            self.auto.cancel(&mut self.timeline);
            self.gate.sync_flags(session);
            info!(
                target: "runtime::session",
                game_id = %session.game_id(),
                winner = ?result.winner,
                "battle over"
            );
            self.event_bus.publish(SessionEvent::Ended {
                game_id: session.game_id(),
                winner: result.winner,
            });
        }

        self.timeline.advance_to(now);
        let out = self
            .sync
            .begin(result, session, &self.config.pacing, &mut self.timeline);
        self.apply(out);
    }

    fn on_round_rejected(&mut self, rejection: RoundRejection) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        warn!(target: "runtime::session", error = %rejection.error, "round rejected by backend");

        let game_id = session.game_id();
        // Mid-playback the reconcile step releases the gate.
        let released = if self.sync.is_playing() {
            false
        } else {
            self.outstanding = None;
            self.gate.release(session)
        };

        self.event_bus.publish(SessionEvent::RoundRejected {
            game_id,
            error: rejection.error.clone(),
        });
        self.event_bus.publish(SessionEvent::Notice(Notice::warning(
            "Action refused",
            rejection.error,
        )));
        if released {
            self.event_bus
                .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
        }

        self.rearm_auto();
    }

    fn fire_due(&mut self) {
        let now = self.elapsed();
        while let Some(scheduled) = self.timeline.pop_due(now) {
            let Some(session) = self
                .session
                .as_ref()
                .filter(|session| session.token() == scheduled.session)
            else {
                trace!(target: "runtime::session", ?scheduled, "task of a closed session dropped");
                continue;
            };

            match scheduled.task {
                Task::Playback(task) => {
                    let out = self.sync.advance(task, session, &mut self.timeline);
                    self.apply(out);
                }
                Task::AutoContinue => {
                    self.auto.fired();
                    self.continue_auto();
                }
            }
        }
    }

    fn continue_auto(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !self.gate.claim_for_auto(session) {
            debug!(target: "runtime::session", "auto continuation skipped");
            return;
        }

        let (token, game_id) = (session.token(), session.game_id());
        debug!(target: "runtime::session", %game_id, "requesting next auto round");
        self.event_bus
            .publish(SessionEvent::AutoRoundRequested { game_id });
        self.event_bus
            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
        self.spawn_request(token, RoundRequest::Auto(AutoRoundRequest { game_id }));
    }

    fn apply(&mut self, out: Output) {
        for event in out.events {
            self.event_bus.publish(event);
        }

        for directive in out.directives {
            match directive {
                Directive::ReleaseGate { cooldowns } => {
                    let Some(session) = self.session.as_mut() else {
                        continue;
                    };
                    self.outstanding = None;
                    let changed = self.gate.refresh_cooldowns(&cooldowns);
                    let released = self.gate.release(session);
                    self.gate.sync_flags(session);
                    if changed || released {
                        self.event_bus
                            .publish(SessionEvent::ControlsChanged(self.gate.controls().clone()));
                    }
                }
                Directive::ContinueAuto => {
                    if let Some(session) = self.session.as_ref() {
                        self.auto.schedule(
                            &mut self.timeline,
                            session,
                            self.config.pacing.auto.auto_continue,
                        );
                    }
                }
                Directive::TearDown => {
                    if let Some(game_id) = self.close_session() {
                        self.event_bus.publish(SessionEvent::TornDown { game_id });
                        self.spawn_stats_refresh();
                    }
                }
            }
        }
    }
}

async fn recv_inbound(rx: &mut Option<mpsc::Receiver<PushInbound>>) -> Option<PushInbound> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
