//! End-to-end battle flows against the mock backend on a paused clock.
use std::time::Duration;

use battle_protocol::{
    Cooldowns, Difficulty, GameId, RoundPayload, RoundRejection, RoundResult, ServerPush, Side,
    SkillId, TurnEvent, Winner,
};
use runtime::transport::mock::MockBattleApi;
use runtime::{
    ConnectionEvent, ControlState, Event, GateDecision, GateRejection, PlaybackEvent, PushInbound, Runtime,
    RuntimeHandle, SessionEvent, Topic, TransportError,
};
use tokio::sync::{broadcast, mpsc};

struct Harness {
    runtime: Runtime,
    handle: RuntimeHandle,
    api: MockBattleApi,
    inbound: mpsc::Sender<PushInbound>,
    playback: broadcast::Receiver<Event>,
    session: broadcast::Receiver<Event>,
}

fn harness() -> Harness {
    let api = MockBattleApi::new();
    let runtime = Runtime::builder()
        .api(api.clone())
        .build()
        .expect("runtime should build");
    let handle = runtime.handle();
    Harness {
        inbound: runtime.inbound(),
        playback: handle.subscribe(Topic::Playback),
        session: handle.subscribe(Topic::Session),
        handle,
        api,
        runtime,
    }
}

impl Harness {
    async fn push_round(&self, result: RoundResult) {
        self.push(RoundPayload::Resolved(result)).await;
    }

    async fn push(&self, payload: RoundPayload) {
        self.inbound
            .send(PushInbound::Message(ServerPush::RoundResolved(payload)))
            .await
            .expect("worker should accept push input");
        settle().await;
    }

    async fn connection(&self, event: ConnectionEvent) {
        self.inbound
            .send(PushInbound::Connection(event))
            .await
            .expect("worker should accept push input");
        settle().await;
    }

    async fn pending(&self) -> bool {
        self.handle
            .session()
            .await
            .expect("session query")
            .expect("battle should be active")
            .is_action_pending
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Lets spawned tasks run without moving the paused clock.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn playback_events(events: &[Event]) -> Vec<PlaybackEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Playback(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn session_events(events: &[Event]) -> Vec<SessionEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Session(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn last_controls(events: &[SessionEvent]) -> Option<ControlState> {
    events.iter().rev().find_map(|event| match event {
        SessionEvent::ControlsChanged(controls) => Some(controls.clone()),
        _ => None,
    })
}

fn authoritative_hp(events: &[PlaybackEvent]) -> Vec<(Side, u32)> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::HpDisplayed {
                side,
                hp,
                authoritative: true,
                ..
            } => Some((*side, *hp)),
            _ => None,
        })
        .collect()
}

fn round_three() -> RoundResult {
    RoundResult::new(3, 12, 8)
        .with_max_hp(20, 20)
        .with_cooldowns(
            Cooldowns::new()
                .with(SkillId::ATTACK, 0)
                .with(SkillId::HEAL, 2)
                .with(SkillId::ULTIMATE, 0),
        )
        .with_events([
            TurnEvent::damage(Side::Dragon, 8, false),
            TurnEvent::damage(Side::Person, 12, true),
        ])
}

#[tokio::test(start_paused = true)]
async fn round_three_reconciles_hp_cooldowns_and_releases_gate() {
    let mut h = harness();
    let game_id = h
        .handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .expect("battle should start");
    assert_eq!(game_id, GameId(1));

    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Accepted
    );
    drain(&mut h.playback);
    drain(&mut h.session);

    h.push_round(round_three()).await;

    // Mid-playback: the gate is still held.
    tokio::time::sleep(ms(1000)).await;
    assert!(h.pending().await);

    tokio::time::sleep(ms(500)).await;
    assert!(!h.pending().await);

    let playback = playback_events(&drain(&mut h.playback));
    assert_eq!(playback.first(), Some(&PlaybackEvent::StatusCleared));
    assert!(playback.contains(&PlaybackEvent::Reconciled { round: 3 }));
    assert_eq!(
        authoritative_hp(&playback),
        vec![(Side::Dragon, 12), (Side::Person, 8)]
    );
    assert!(
        !playback
            .iter()
            .any(|event| matches!(event, PlaybackEvent::WinnerShown { .. }))
    );

    let session = session_events(&drain(&mut h.session));
    let controls = last_controls(&session).expect("controls should be published");
    assert!(controls.is_enabled(SkillId::ATTACK));
    assert!(controls.is_enabled(SkillId::ULTIMATE));
    assert!(!controls.is_enabled(SkillId::HEAL));
    assert_eq!(controls.cooldowns.remaining(SkillId::HEAL), 2);
    assert!(
        !session
            .iter()
            .any(|event| matches!(event, SessionEvent::Ended { .. } | SessionEvent::TornDown { .. }))
    );

    let snapshot = h.handle.session().await.unwrap().unwrap();
    assert_eq!(snapshot.current_round, 3);
    assert!(!snapshot.finished);

    h.runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rapid_submits_send_a_single_action() {
    let h = harness();
    h.handle
        .start_battle("Bo", Difficulty::Easy, false)
        .await
        .unwrap();

    let mut decisions = Vec::new();
    for _ in 0..5 {
        decisions.push(h.handle.submit(SkillId::ATTACK).await.unwrap());
    }
    settle().await;

    assert_eq!(decisions[0], GateDecision::Accepted);
    assert!(
        decisions[1..]
            .iter()
            .all(|decision| *decision == GateDecision::Rejected(GateRejection::ActionPending))
    );
    assert_eq!(h.api.actions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn final_round_shows_winner_then_tears_down_and_refreshes_once() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Hard, false)
        .await
        .unwrap();
    h.handle.submit(SkillId::ATTACK).await.unwrap();
    drain(&mut h.playback);
    drain(&mut h.session);

    let last = RoundResult::new(6, 5, 0)
        .with_events([TurnEvent::damage(Side::Person, 4, false)])
        .finished(Winner::Dragon);
    h.push_round(last).await;

    tokio::time::sleep(ms(800)).await;
    let playback = playback_events(&drain(&mut h.playback));
    assert!(playback.contains(&PlaybackEvent::WinnerShown {
        winner: Winner::Dragon
    }));
    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Rejected(GateRejection::GameOver)
    );
    assert_eq!(h.api.overview_calls(), 0);

    // Teardown fires 3000ms after reconciliation (at 700ms).
    tokio::time::sleep(ms(3000)).await;
    settle().await;

    let session = session_events(&drain(&mut h.session));
    assert!(session.contains(&SessionEvent::TornDown { game_id: GameId(1) }));
    assert!(h.handle.session().await.unwrap().is_none());
    assert_eq!(h.api.overview_calls(), 1);

    tokio::time::sleep(ms(10_000)).await;
    assert_eq!(h.api.overview_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn auto_mode_never_requests_before_reconciliation() {
    let h = harness();
    h.handle
        .start_battle("Auto", Difficulty::Normal, true)
        .await
        .unwrap();

    // First continuation follows the initial state after the auto delay.
    tokio::time::sleep(ms(999)).await;
    assert!(h.api.auto_requests().is_empty());
    tokio::time::sleep(ms(2)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 1);

    let round = RoundResult::new(2, 15, 17).with_events([
        TurnEvent::damage(Side::Dragon, 5, false),
        TurnEvent::damage(Side::Person, 3, false),
    ]);
    h.push_round(round).await;

    // Auto pacing: reconcile at 600ms, next request 1000ms later.
    tokio::time::sleep(ms(1500)).await;
    assert_eq!(h.api.auto_requests().len(), 1);
    tokio::time::sleep(ms(200)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn newer_round_preempts_playback_in_progress() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.handle.submit(SkillId::ATTACK).await.unwrap();

    let superseded = RoundResult::new(2, 10, 10).with_events([
        TurnEvent::damage(Side::Dragon, 10, false),
        TurnEvent::damage(Side::Person, 10, false),
    ]);
    h.push_round(superseded).await;
    tokio::time::sleep(ms(500)).await;
    drain(&mut h.playback);

    let newer = RoundResult::new(3, 14, 16).with_events([TurnEvent::heal(Side::Person, 1)]);
    h.push_round(newer).await;
    tokio::time::sleep(ms(2000)).await;

    let playback = playback_events(&drain(&mut h.playback));
    assert!(
        !playback
            .iter()
            .any(|event| matches!(event, PlaybackEvent::ActorActing { index: 1, .. })),
        "superseded round must not continue: {playback:?}"
    );
    let reconciled: Vec<_> = playback
        .iter()
        .filter(|event| matches!(event, PlaybackEvent::Reconciled { .. }))
        .collect();
    assert_eq!(reconciled, vec![&PlaybackEvent::Reconciled { round: 3 }]);
    assert_eq!(
        authoritative_hp(&playback),
        vec![(Side::Dragon, 14), (Side::Person, 16)]
    );
    assert!(!h.pending().await);
}

#[tokio::test(start_paused = true)]
async fn backend_refusal_releases_gate_without_touching_hp() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    // The ultimate starts every battle on cooldown.
    assert_eq!(
        h.handle.submit(SkillId::ULTIMATE).await.unwrap(),
        GateDecision::Rejected(GateRejection::OnCooldown {
            skill: SkillId::ULTIMATE,
            remaining: 3
        })
    );
    h.handle.submit(SkillId::ATTACK).await.unwrap();
    drain(&mut h.playback);
    drain(&mut h.session);

    h.push(RoundPayload::Rejected(RoundRejection {
        error: "技能冷卻中".to_string(),
    }))
    .await;

    assert!(!h.pending().await);
    assert!(drain(&mut h.playback).is_empty());
    let session = session_events(&drain(&mut h.session));
    assert!(session.iter().any(|event| matches!(
        event,
        SessionEvent::Notice(notice) if notice.message.contains("技能冷卻中")
    )));
}

#[tokio::test(start_paused = true)]
async fn failed_action_request_releases_gate() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.api
        .fail_next_action(TransportError::Network("connection reset".to_string()));
    drain(&mut h.session);

    h.handle.submit(SkillId::ATTACK).await.unwrap();
    settle().await;

    assert!(!h.pending().await);
    let session = session_events(&drain(&mut h.session));
    assert!(
        session
            .iter()
            .any(|event| matches!(event, SessionEvent::RequestFailed { .. }))
    );
    assert!(last_controls(&session).unwrap().is_enabled(SkillId::ATTACK));
}

#[tokio::test(start_paused = true)]
async fn failed_start_creates_no_session() {
    let mut h = harness();
    h.api
        .fail_next_start(TransportError::Rejected("server busy".to_string()));

    let err = h
        .handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("server busy"));
    assert!(h.handle.session().await.unwrap().is_none());
    assert!(
        session_events(&drain(&mut h.session))
            .iter()
            .any(|event| matches!(event, SessionEvent::StartFailed { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn submit_without_battle_is_ignored() {
    let h = harness();
    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Ignored
    );
    assert!(h.api.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn closing_cancels_pending_auto_continuation() {
    let h = harness();
    h.handle
        .start_battle("Auto", Difficulty::Normal, true)
        .await
        .unwrap();

    tokio::time::sleep(ms(500)).await;
    assert!(h.handle.close_battle().await.unwrap());
    assert!(!h.handle.close_battle().await.unwrap());

    tokio::time::sleep(ms(5000)).await;
    assert!(h.api.auto_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn toggling_auto_mode_arms_and_disarms_the_driver() {
    let h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();

    h.handle.set_auto_mode(true).await.unwrap();
    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Rejected(GateRejection::AutoMode)
    );
    h.handle.set_auto_mode(false).await.unwrap();
    tokio::time::sleep(ms(2000)).await;
    assert!(h.api.auto_requests().is_empty());

    h.handle.set_auto_mode(true).await.unwrap();
    tokio::time::sleep(ms(1100)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_round_of_closed_battle_is_ignored() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.handle.close_battle().await.unwrap();
    drain(&mut h.playback);

    h.push_round(round_three()).await;
    tokio::time::sleep(ms(2000)).await;
    assert!(drain(&mut h.playback).is_empty());
}

#[tokio::test(start_paused = true)]
async fn losing_the_push_channel_releases_an_outstanding_action() {
    let mut h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.handle.submit(SkillId::ATTACK).await.unwrap();
    settle().await;
    assert!(h.pending().await);
    drain(&mut h.session);

    h.connection(ConnectionEvent::Disconnected {
        reason: "reset by peer".to_string(),
    })
    .await;
    h.connection(ConnectionEvent::PollingEnabled).await;

    assert!(!h.pending().await);
    let session = session_events(&drain(&mut h.session));
    assert!(session.iter().any(|event| matches!(
        event,
        SessionEvent::Notice(notice) if notice.title == "Connection lost"
    )));
    assert!(last_controls(&session).unwrap().is_enabled(SkillId::ATTACK));

    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Accepted
    );
    settle().await;
    assert_eq!(h.api.actions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn auto_mode_resumes_after_push_loss() {
    let h = harness();
    h.handle
        .start_battle("Auto", Difficulty::Normal, true)
        .await
        .unwrap();
    tokio::time::sleep(ms(1001)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 1);
    assert!(h.pending().await);

    h.connection(ConnectionEvent::Disconnected {
        reason: "reset by peer".to_string(),
    })
    .await;
    assert!(!h.pending().await);

    tokio::time::sleep(ms(1001)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn push_loss_during_playback_waits_for_reconciliation() {
    let h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.handle.submit(SkillId::ATTACK).await.unwrap();
    h.push_round(round_three()).await;
    tokio::time::sleep(ms(500)).await;

    h.connection(ConnectionEvent::Disconnected {
        reason: "reset by peer".to_string(),
    })
    .await;
    assert!(h.pending().await);

    tokio::time::sleep(ms(1000)).await;
    assert!(!h.pending().await);
}

#[tokio::test(start_paused = true)]
async fn auto_mode_enabled_during_failing_action_still_continues() {
    let h = harness();
    h.api.set_round_latency(ms(100));
    h.api
        .fail_next_action(TransportError::Network("connection reset".to_string()));
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();

    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Accepted
    );
    h.handle.set_auto_mode(true).await.unwrap();
    assert!(h.pending().await);

    tokio::time::sleep(ms(150)).await;
    settle().await;
    let snapshot = h.handle.session().await.unwrap().unwrap();
    assert!(!snapshot.is_action_pending);
    assert!(snapshot.is_auto_mode);
    assert!(h.api.auto_requests().is_empty());

    tokio::time::sleep(ms(1000)).await;
    settle().await;
    assert_eq!(h.api.auto_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn refusal_during_playback_keeps_controls_locked() {
    let h = harness();
    h.handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    h.handle.submit(SkillId::ATTACK).await.unwrap();
    h.push_round(round_three()).await;
    tokio::time::sleep(ms(500)).await;

    h.push(RoundPayload::Rejected(RoundRejection {
        error: "stale request".to_string(),
    }))
    .await;
    assert!(h.pending().await);
    assert_eq!(
        h.handle.submit(SkillId::ATTACK).await.unwrap(),
        GateDecision::Rejected(GateRejection::ActionPending)
    );

    tokio::time::sleep(ms(1000)).await;
    assert!(!h.pending().await);
}
