// streamwatch-core/src/services/stream_presence/reconciler.rs
//
// Per-account diff between what Helix reported and what `channels_streams` holds.
// The store is written before the matching event is published; an event is never
// published for a write that failed.

use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::services::stream_presence::fetcher::FetchOutcome;
use crate::services::stream_presence::notifier::StreamNotifier;
use streamwatch_common::models::{PresenceRecord, Transition};
use streamwatch_common::traits::repository_traits::StreamRepository;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: usize,
    pub continued: usize,
    pub ended: usize,
    pub write_errors: usize,
    pub publish_errors: usize,
}

/// Reconciles every id in `fetch.fetched` against `existing`.
/// Ids whose batch failed are not in `fetch.fetched` and are left untouched.
pub async fn reconcile(
    store: &dyn StreamRepository,
    notifier: &StreamNotifier,
    fetch: &FetchOutcome,
    existing: &[PresenceRecord],
) -> ReconcileReport {
    let records: HashMap<&str, &PresenceRecord> =
        existing.iter().map(|r| (r.user_id.as_str(), r)).collect();

    let mut ids: Vec<&String> = fetch.fetched.iter().collect();
    ids.sort();

    let mut report = ReconcileReport::default();

    for user_id in ids {
        let snapshot = fetch.snapshots.get(user_id);
        let previous = records.get(user_id.as_str()).copied();

        match Transition::classify(snapshot.is_some(), previous.is_some()) {
            Transition::Started => {
                let Some(snapshot) = snapshot else { continue };
                let record = PresenceRecord::from_snapshot(snapshot, previous);
                if let Err(e) = store.upsert(&record).await {
                    error!("Failed to store new stream {} for channel {}: {}", record.id, user_id, e);
                    report.write_errors += 1;
                    continue;
                }
                report.started += 1;
                info!("Channel {} went live (stream {})", user_id, record.id);

                if let Err(e) = notifier.stream_online(&record.id, user_id).await {
                    error!("Failed to publish stream.online for channel {}: {}", user_id, e);
                    report.publish_errors += 1;
                }
            }
            Transition::Continuing => {
                let Some(snapshot) = snapshot else { continue };
                let record = PresenceRecord::from_snapshot(snapshot, previous);
                if let Err(e) = store.upsert(&record).await {
                    error!("Failed to update stream {} for channel {}: {}", record.id, user_id, e);
                    report.write_errors += 1;
                    continue;
                }
                report.continued += 1;
                debug!("Channel {} still live (stream {})", user_id, record.id);
            }
            Transition::Ended => {
                if let Err(e) = store.delete_by_user_id(user_id).await {
                    error!("Failed to delete stream for channel {}: {}", user_id, e);
                    report.write_errors += 1;
                    continue;
                }
                report.ended += 1;
                info!("Channel {} went offline", user_id);

                if let Err(e) = notifier.stream_offline(user_id).await {
                    error!("Failed to publish stream.offline for channel {}: {}", user_id, e);
                    report.publish_errors += 1;
                }
            }
            Transition::Absent => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use mockall::mock;
    use crate::Error;
    use crate::eventbus::EventBus;
    use crate::test_utils::fakes::{snapshot, FakeStreamRepository, StoreCall};
    use streamwatch_common::traits::api::EventPublisher;

    mock! {
        pub Publisher {}

        #[async_trait]
        impl EventPublisher for Publisher {
            async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error>;
        }
    }

    fn outcome(fetched: &[&str], live: &[(&str, &str)]) -> FetchOutcome {
        let mut out = FetchOutcome::default();
        out.fetched = fetched.iter().map(|s| s.to_string()).collect();
        for (stream_id, user_id) in live {
            out.snapshots.insert(user_id.to_string(), snapshot(stream_id, user_id));
        }
        out
    }

    fn record(stream_id: &str, user_id: &str, parsed: i64) -> PresenceRecord {
        let mut r = PresenceRecord::from_snapshot(&snapshot(stream_id, user_id), None);
        r.parsed_messages = parsed;
        r
    }

    #[tokio::test]
    async fn test_continuing_keeps_parsed_messages_and_emits_nothing() {
        let store = FakeStreamRepository::with_records(vec![record("old", "42", 42)]);
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(8)).await;
        let notifier = StreamNotifier::new(Arc::new(bus));

        let fetch = outcome(&["42"], &[("new-session", "42")]);
        let existing = store.snapshot_records();
        let report = reconcile(&store, &notifier, &fetch, &existing).await;

        assert_eq!(report.continued, 1);
        let stored = store.get("42").unwrap();
        assert_eq!(stored.id, "new-session");
        assert_eq!(stored.parsed_messages, 42);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_absent_touches_nothing() {
        let store = FakeStreamRepository::default();
        let notifier = StreamNotifier::new(Arc::new(EventBus::new()));

        let report = reconcile(&store, &notifier, &outcome(&["1", "2"], &[]), &[]).await;

        assert_eq!(report, ReconcileReport::default());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_suppresses_event() {
        let store = FakeStreamRepository::default();
        store.fail_writes_for("B");
        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(0);
        let notifier = StreamNotifier::new(Arc::new(publisher));

        let report = reconcile(&store, &notifier, &outcome(&["B"], &[("s1", "B")]), &[]).await;

        assert_eq!(report.write_errors, 1);
        assert_eq!(report.started, 0);
        assert!(store.get("B").is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_record_and_suppresses_event() {
        let store = FakeStreamRepository::with_records(vec![record("s0", "A", 3)]);
        store.fail_writes_for("A");
        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(0);
        let notifier = StreamNotifier::new(Arc::new(publisher));

        let existing = store.snapshot_records();
        let report = reconcile(&store, &notifier, &outcome(&["A"], &[]), &existing).await;

        assert_eq!(report.write_errors, 1);
        assert!(store.get("A").is_some());
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_store_mutation() {
        let store = FakeStreamRepository::default();
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .withf(|topic, _| topic == "stream.online")
            .times(1)
            .returning(|_, _| Err(Error::EventBus("transport down".into())));
        let notifier = StreamNotifier::new(Arc::new(publisher));

        let report = reconcile(&store, &notifier, &outcome(&["B"], &[("s1", "B")]), &[]).await;

        assert_eq!(report.started, 1);
        assert_eq!(report.publish_errors, 1);
        assert!(store.get("B").is_some());
    }

    #[tokio::test]
    async fn test_write_happens_before_publish() {
        let store = Arc::new(FakeStreamRepository::with_records(vec![record("s0", "A", 0)]));
        let observed = store.clone();
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .times(2)
            .returning(move |topic, _| {
                match topic {
                    "stream.online" => assert!(observed.get("B").is_some()),
                    "stream.offline" => assert!(observed.get("A").is_none()),
                    other => panic!("unexpected topic {other}"),
                }
                Ok(())
            });
        let notifier = StreamNotifier::new(Arc::new(publisher));

        let existing = store.snapshot_records();
        let report = reconcile(store.as_ref(), &notifier, &outcome(&["A", "B"], &[("s1", "B")]), &existing).await;

        assert_eq!(report.started, 1);
        assert_eq!(report.ended, 1);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Delete("A".into()), StoreCall::Upsert("B".into())]
        );
    }
}
