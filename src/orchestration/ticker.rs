//! Background price ticker.
//!
//! Polls the price feed on a fixed interval and folds fresh observations
//! into the ledger. The loop never exits on its own; feed and database
//! failures are logged and retried on the next tick.

use crate::orchestration::game::GameService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

pub fn spawn_price_ticker(
    service: Arc<Mutex<GameService>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately; skip it so startup reconciliation
        // settles before the feed is polled.
        interval.tick().await;

        info!(interval_secs, "Price ticker started");
        loop {
            interval.tick().await;
            let report = {
                let mut service = service.lock().await;
                service.tick_prices().await
            };
            if report.level_ups > 0 || report.damage_events > 0 {
                info!(
                    level_ups = report.level_ups,
                    damage_events = report.damage_events,
                    "Tick changed creature state"
                );
            }
        }
    })
}
