// streamwatch-core/src/services/stream_presence/fetcher.rs
//
// Splits the tracked set into Helix-sized batches and fetches them concurrently,
// one task per batch. A batch that errors, reports an error body, times out or
// panics contributes nothing: its ids are unknown for this cycle.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::Error;
use streamwatch_common::models::LiveSnapshot;
use streamwatch_common::traits::api::LiveStatusApi;

/// Result of fetching every batch of one cycle.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Ids whose batch succeeded. Only these may be reconciled.
    pub fetched: HashSet<String>,
    /// Live snapshots keyed by user id, restricted to `fetched`.
    pub snapshots: HashMap<String, LiveSnapshot>,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Partitions ids into chunks of at most `batch_size`.
pub fn partition(tracked: &BTreeSet<String>, batch_size: usize) -> Vec<Vec<String>> {
    let ids: Vec<String> = tracked.iter().cloned().collect();
    ids.chunks(batch_size.max(1)).map(|c| c.to_vec()).collect()
}

pub async fn fetch_live_snapshots(
    api: Arc<dyn LiveStatusApi>,
    tracked: &BTreeSet<String>,
    batch_size: usize,
    fetch_timeout: Duration,
) -> FetchOutcome {
    let batches = partition(tracked, batch_size);
    let mut outcome = FetchOutcome {
        batches: batches.len(),
        ..Default::default()
    };

    let mut set = JoinSet::new();
    for (index, batch) in batches.into_iter().enumerate() {
        let api = api.clone();
        set.spawn(async move {
            let result = match tokio::time::timeout(fetch_timeout, api.get_live_status(&batch)).await {
                Ok(res) => res,
                Err(elapsed) => Err(Error::Timeout(elapsed)),
            };
            (index, batch, result)
        });
    }

    let mut succeeded = 0usize;
    while let Some(joined) = set.join_next().await {
        let (index, batch, result) = match joined {
            Ok(v) => v,
            Err(e) => {
                error!("Live status batch task failed to complete: {}", e);
                continue;
            }
        };

        let response = match result {
            Ok(r) if r.is_error() => {
                warn!(
                    "Live status batch {} ({} ids) returned an error: {}",
                    index,
                    batch.len(),
                    r.error_message.unwrap_or_default()
                );
                continue;
            }
            Ok(r) => r,
            Err(e) => {
                warn!("Live status batch {} ({} ids) failed: {}", index, batch.len(), e);
                continue;
            }
        };

        succeeded += 1;
        let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();
        for snap in response.streams {
            if !requested.contains(snap.user_id.as_str()) {
                debug!("Ignoring unrequested stream for user {}", snap.user_id);
                continue;
            }
            outcome.snapshots.entry(snap.user_id.clone()).or_insert(snap);
        }
        outcome.fetched.extend(batch);
    }

    outcome.failed_batches = outcome.batches - succeeded;
    outcome
}
