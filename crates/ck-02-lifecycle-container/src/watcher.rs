//! Periodic health watcher.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::service::LifecycleContainer;

/// Check running services every `health_check_interval` until `shutdown`
/// flips to `true` or its sender is dropped.
pub fn spawn_health_watcher(
    container: LifecycleContainer,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = container
            .config()
            .health_check_interval
            .max(Duration::from_millis(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; services were just started.
        ticker.tick().await;

        info!(interval_ms = period.as_millis() as u64, "[Container] Health watcher started");
        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => {
                    let changed = container.check_health_once().await;
                    if changed > 0 {
                        debug!(changed, "[Container] Health sweep changed service states");
                    }
                }
            }
        }
        info!("[Container] Health watcher stopped");
    })
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
