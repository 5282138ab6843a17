//! HTTP polling fallback and one-shot stats refresh.
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::BattleApi;
use crate::events::{EventBus, StatsEvent};

/// Fetches overview, per-side stats and recent games, publishing whatever
/// succeeds.
pub(crate) async fn refresh_stats(api: &dyn BattleApi, bus: &EventBus) {
    let (overview, characters, recent) = tokio::join!(
        api.overall_stats(),
        api.character_stats(),
        api.recent_games()
    );

    match overview {
        Ok(stats) => bus.publish(StatsEvent::Overview(stats)),
        Err(err) => warn!(target: "runtime::http", %err, "failed to load overview stats"),
    }
    match characters {
        Ok(stats) => bus.publish(StatsEvent::Characters(stats)),
        Err(err) => warn!(target: "runtime::http", %err, "failed to load character stats"),
    }
    match recent {
        Ok(games) => bus.publish(StatsEvent::RecentGames(games)),
        Err(err) => warn!(target: "runtime::http", %err, "failed to load recent games"),
    }
}

/// Refreshes stats every `interval` until aborted.
pub(crate) async fn run_polling(api: Arc<dyn BattleApi>, bus: EventBus, interval: Duration) {
    info!(target: "runtime::http", ?interval, "polling fallback started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        refresh_stats(api.as_ref(), &bus).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, Topic};
    use crate::transport::mock::MockBattleApi;

    #[tokio::test(start_paused = true)]
    async fn polls_on_every_interval() {
        let api = MockBattleApi::new();
        let bus = EventBus::new();
        let mut stats_rx = bus.subscribe(Topic::Stats);

        let task = tokio::spawn(run_polling(
            Arc::new(api.clone()),
            bus.clone(),
            Duration::from_secs(10),
        ));

        assert!(matches!(
            stats_rx.recv().await.unwrap(),
            Event::Stats(StatsEvent::Overview(_))
        ));
        tokio::time::sleep(Duration::from_secs(25)).await;
        task.abort();

        assert_eq!(api.overview_calls(), 3);
    }
}
