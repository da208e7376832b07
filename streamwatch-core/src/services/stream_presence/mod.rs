// streamwatch-core/src/services/stream_presence/mod.rs
//
// One reconciliation cycle: resolve the tracked set, read the stored presence
// rows, fetch live status in parallel batches, then diff and publish.

pub mod fetcher;
pub mod notifier;
pub mod reconciler;
pub mod tracked_set;

use std::sync::Arc;
use tracing::{debug, info};

use crate::Error;
use crate::config::PresenceConfig;
use streamwatch_common::traits::api::{EventPublisher, LiveStatusApi};
use streamwatch_common::traits::repository_traits::{
    ChannelRepository, IntegrationRepository, StreamRepository,
};

pub use fetcher::{fetch_live_snapshots, FetchOutcome};
pub use notifier::StreamNotifier;
pub use reconciler::{reconcile, ReconcileReport};
pub use tracked_set::resolve_tracked_set;

/// Counters for one completed cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub tracked: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub fetched: usize,
    pub live: usize,
    pub started: usize,
    pub continued: usize,
    pub ended: usize,
    pub write_errors: usize,
    pub publish_errors: usize,
}

pub struct StreamPresenceService {
    channels: Arc<dyn ChannelRepository>,
    integrations: Arc<dyn IntegrationRepository>,
    streams: Arc<dyn StreamRepository>,
    live_status: Arc<dyn LiveStatusApi>,
    notifier: StreamNotifier,
    config: PresenceConfig,
}

impl StreamPresenceService {
    pub fn new(
        channels: Arc<dyn ChannelRepository>,
        integrations: Arc<dyn IntegrationRepository>,
        streams: Arc<dyn StreamRepository>,
        live_status: Arc<dyn LiveStatusApi>,
        publisher: Arc<dyn EventPublisher>,
        config: PresenceConfig,
    ) -> Self {
        Self {
            channels,
            integrations,
            streams,
            live_status,
            notifier: StreamNotifier::new(publisher),
            config,
        }
    }

    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    /// Runs one cycle to completion.
    ///
    /// Errors reading channels, integrations or the stored rows abort the cycle
    /// before anything is written. Batch, write and publish failures are logged
    /// and counted in the report instead.
    pub async fn run_cycle(&self) -> Result<CycleReport, Error> {
        let tracked = resolve_tracked_set(self.channels.as_ref(), self.integrations.as_ref()).await?;
        let existing = self.streams.list_all().await?;

        let mut report = CycleReport {
            tracked: tracked.len(),
            ..Default::default()
        };

        if tracked.is_empty() {
            debug!("No channels to check this cycle");
            return Ok(report);
        }

        let fetch = fetch_live_snapshots(
            self.live_status.clone(),
            &tracked,
            self.config.effective_batch_size(),
            self.config.fetch_timeout,
        )
        .await;

        report.batches = fetch.batches;
        report.failed_batches = fetch.failed_batches;
        report.fetched = fetch.fetched.len();
        report.live = fetch.snapshots.len();

        let diff = reconcile(self.streams.as_ref(), &self.notifier, &fetch, &existing).await;
        report.started = diff.started;
        report.continued = diff.continued;
        report.ended = diff.ended;
        report.write_errors = diff.write_errors;
        report.publish_errors = diff.publish_errors;

        info!(
            "Stream check: tracked={} live={} batches={} failed_batches={} started={} ended={} write_errors={} publish_errors={}",
            report.tracked,
            report.live,
            report.batches,
            report.failed_batches,
            report.started,
            report.ended,
            report.write_errors,
            report.publish_errors
        );
        Ok(report)
    }
}
