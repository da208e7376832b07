// streamwatch-core/src/tasks/stream_presence.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::services::stream_presence::StreamPresenceService;

/// Spawns the background task that keeps `channels_streams` in sync with Helix.
/// The interval comes from the service's config (production vs development).
pub fn spawn_stream_presence_task(
    service: Arc<StreamPresenceService>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = service.config().tick_interval();
    tokio::spawn(run_stream_presence_loop(service, period, cancel))
}

/// Runs a cycle immediately, then once per `period` until `cancel` fires.
///
/// Cycles never overlap: the next tick is only awaited after the current cycle
/// returns, and ticks missed while a cycle overran are skipped. Cancellation is
/// only observed between cycles, so an in-flight cycle always completes.
pub async fn run_stream_presence_loop(
    service: Arc<StreamPresenceService>,
    period: Duration,
    cancel: CancellationToken,
) {
    info!("Stream presence task started (every {:?})", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Run on its own task so a panic inside one cycle cannot end the loop.
        let svc = service.clone();
        match tokio::spawn(async move { svc.run_cycle().await }).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Stream presence cycle failed: {}", e),
            Err(e) => error!("Stream presence cycle aborted: {}", e),
        }
    }

    info!("Stream presence task stopped");
}
