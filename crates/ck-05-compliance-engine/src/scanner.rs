//! Background corpus scanner.
//!
//! Rescans after capability or lifecycle events, once the bus has been quiet
//! for `scan_interval`. Findings from the engine itself never trigger a scan.

use std::sync::Arc;

use shared_bus::{EventFilter, EventSubscriber, EventTopic, InMemoryEventBus, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::ports::{ComplianceApi, CorpusSource};
use crate::service::ComplianceEngine;

/// Spawn the scanner. It exits when `shutdown` flips to `true`, its sender is
/// dropped, or the bus closes.
pub fn spawn_scanner(
    engine: Arc<ComplianceEngine>,
    source: Arc<dyn CorpusSource>,
    bus: &InMemoryEventBus,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let subscription = bus.subscribe(EventFilter::topics(vec![
        EventTopic::Capability,
        EventTopic::Lifecycle,
    ]));
    tokio::spawn(run_scanner(engine, source, subscription, shutdown))
}

async fn run_scanner(
    engine: Arc<ComplianceEngine>,
    source: Arc<dyn CorpusSource>,
    mut subscription: Subscription,
    mut shutdown: watch::Receiver<bool>,
) {
    let interval = engine.config().scan_interval;
    info!(interval_ms = interval.as_millis() as u64, "[Compliance] Scanner started");

    'outer: loop {
        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => break,
            event = subscription.recv() => {
                if event.is_none() {
                    break;
                }
            }
        }

        // Debounce: keep absorbing events until the bus is quiet.
        let mut deadline = Instant::now() + interval;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                _ = wait_for_shutdown(&mut shutdown) => break 'outer,
                event = subscription.recv() => {
                    if event.is_none() {
                        break 'outer;
                    }
                    deadline = Instant::now() + interval;
                }
            }
        }

        let engine = Arc::clone(&engine);
        let source = Arc::clone(&source);
        let scan = tokio::task::spawn_blocking(move || engine.scan_corpus(source.as_ref()));
        match scan.await {
            Ok(report) => debug!(findings = report.findings, "[Compliance] Background scan done"),
            Err(e) => error!(error = %e, "[Compliance] Background scan panicked"),
        }
    }

    info!(lagged = subscription.lagged(), "[Compliance] Scanner stopped");
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
