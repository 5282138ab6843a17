//! Push channel wiring: subscription, reconnection and the polling fallback.
use std::time::Duration;

use battle_protocol::{
    ClientPush, Difficulty, GameId, GameRecord, RoundPayload, RoundResult, ServerPush,
};
use runtime::transport::mock::{MockBattleApi, MockPushConnector};
use runtime::{
    ConnectionEvent, Event, PushConfig, Runtime, RuntimeConfig, StatsEvent, Topic,
};
use tokio::sync::broadcast;

fn config() -> RuntimeConfig {
    RuntimeConfig {
        push: PushConfig {
            max_reconnect_attempts: 2,
            reconnect_delay: Duration::from_millis(100),
            reconnect_delay_max: Duration::from_millis(400),
        },
        polling_interval: Duration::from_secs(1),
        ..RuntimeConfig::default()
    }
}

async fn next_connection_event(rx: &mut broadcast::Receiver<Event>) -> ConnectionEvent {
    match rx.recv().await.expect("connection topic open") {
        Event::Connection(event) => event,
        other => panic!("unexpected event on connection topic: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn battle_start_subscribes_and_rounds_flow_through_the_socket() {
    let api = MockBattleApi::new();
    let connector = MockPushConnector::new();
    let runtime = Runtime::builder()
        .config(config())
        .api(api.clone())
        .push_connector(connector.clone())
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut connection = handle.subscribe(Topic::Connection);

    assert_eq!(next_connection_event(&mut connection).await, ConnectionEvent::Connected);

    let game_id = handle
        .start_battle("Ari", Difficulty::Normal, false)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(connector.sent(), vec![ClientPush::Subscribe { game_id }]);

    handle.submit(battle_protocol::SkillId::ATTACK).await.unwrap();
    assert!(connector.push(&ServerPush::RoundResolved(RoundPayload::Resolved(
        RoundResult::new(2, 18, 20).with_game_id(game_id)
    ))));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = handle.session().await.unwrap().unwrap();
    assert_eq!(snapshot.current_round, 2);
    assert!(!snapshot.is_action_pending);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn finished_game_announcement_refreshes_stats() {
    let api = MockBattleApi::new();
    let connector = MockPushConnector::new();
    let runtime = Runtime::builder()
        .config(config())
        .api(api.clone())
        .push_connector(connector.clone())
        .build()
        .unwrap();
    let mut stats = runtime.handle().subscribe(Topic::Stats);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let record: GameRecord = serde_json::from_str(
        r#"{"game_id": 77, "total_rounds": 9, "winner": "勇者", "player_name": "Cy"}"#,
    )
    .unwrap();
    assert!(connector.push(&ServerPush::GameFinished(record)));
    tokio::time::sleep(Duration::from_millis(10)).await;

    match stats.recv().await.unwrap() {
        Event::Stats(StatsEvent::GameFinished(record)) => assert_eq!(record.game_id, GameId(77)),
        other => panic!("unexpected stats event: {other:?}"),
    }
    assert_eq!(api.overview_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn repeated_connection_failures_switch_to_polling() {
    let api = MockBattleApi::new();
    let connector = MockPushConnector::new();
    connector.refuse_next(u32::MAX);
    let runtime = Runtime::builder()
        .config(config())
        .api(api.clone())
        .push_connector(connector.clone())
        .build()
        .unwrap();
    let mut connection = runtime.handle().subscribe(Topic::Connection);

    assert!(matches!(
        next_connection_event(&mut connection).await,
        ConnectionEvent::ConnectionFailed { attempt: 1, .. }
    ));
    assert!(matches!(
        next_connection_event(&mut connection).await,
        ConnectionEvent::ConnectionFailed { attempt: 2, .. }
    ));
    assert_eq!(
        next_connection_event(&mut connection).await,
        ConnectionEvent::PollingEnabled
    );

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(api.overview_calls(), 3);
    assert_eq!(connector.attempts(), 2);

    runtime.shutdown().await.unwrap();
}
