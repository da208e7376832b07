// File: streamwatch-core/src/test_utils/fakes.rs
//
// In-memory stand-ins for every external seam of the presence loop.
// Each one records what it was asked to do and can be told to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::Error;
use streamwatch_common::models::{ChannelRecord, IntegrationRecord, LiveSnapshot, PresenceRecord};
use streamwatch_common::traits::api::{LiveStatusApi, LiveStatusResponse};
use streamwatch_common::traits::repository_traits::{
    ChannelRepository, IntegrationRepository, StreamRepository,
};

/// A plausible live snapshot for `user_id` with session `stream_id`.
pub fn snapshot(stream_id: &str, user_id: &str) -> LiveSnapshot {
    LiveSnapshot {
        id: stream_id.to_string(),
        user_id: user_id.to_string(),
        user_login: format!("user_{user_id}"),
        user_name: format!("User{user_id}"),
        game_id: "509658".to_string(),
        game_name: "Just Chatting".to_string(),
        stream_type: "live".to_string(),
        title: format!("stream {stream_id}"),
        viewer_count: 12,
        started_at: Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
        language: "en".to_string(),
        thumbnail_url: format!("https://static-cdn.jtvnw.net/previews-ttv/live_user_{user_id}-{{width}}x{{height}}.jpg"),
        tags: vec!["English".to_string()],
        is_mature: false,
    }
}

fn injected(what: &str) -> Error {
    Error::Platform(format!("injected failure: {what}"))
}

// ---------------------------------------------------------------------------
// channels
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeChannelRepository {
    channels: Mutex<Vec<ChannelRecord>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeChannelRepository {
    /// `(id, is_enabled, is_banned)` triples; filtering is left to the caller.
    pub fn with_channels(rows: &[(&str, bool, bool)]) -> Self {
        let channels = rows
            .iter()
            .map(|(id, enabled, banned)| ChannelRecord {
                id: id.to_string(),
                is_enabled: *enabled,
                is_banned: *banned,
            })
            .collect();
        Self {
            channels: Mutex::new(channels),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let me = Self::default();
        me.fail.store(true, Ordering::SeqCst);
        me
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelRepository for FakeChannelRepository {
    async fn list_trackable_channels(&self) -> Result<Vec<ChannelRecord>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("list_trackable_channels"));
        }
        Ok(self.channels.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// integrations
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeIntegrationRepository {
    integration_id: Option<String>,
    links: Vec<IntegrationRecord>,
    fail: bool,
}

impl FakeIntegrationRepository {
    /// No Discord integration row at all.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_links(links: Vec<IntegrationRecord>) -> Self {
        Self {
            integration_id: Some("discord".to_string()),
            links,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl IntegrationRepository for FakeIntegrationRepository {
    async fn find_discord_integration_id(&self) -> Result<Option<String>, Error> {
        if self.fail {
            return Err(injected("find_discord_integration_id"));
        }
        Ok(self.integration_id.clone())
    }

    async fn list_channel_integrations(&self, integration_id: &str) -> Result<Vec<IntegrationRecord>, Error> {
        if self.integration_id.as_deref() != Some(integration_id) {
            return Ok(Vec::new());
        }
        Ok(self.links.clone())
    }
}

// ---------------------------------------------------------------------------
// channels_streams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Upsert(String),
    Delete(String),
}

#[derive(Default)]
pub struct FakeStreamRepository {
    records: Mutex<HashMap<String, PresenceRecord>>,
    failing_ids: Mutex<HashSet<String>>,
    fail_list: AtomicBool,
    calls: Mutex<Vec<StoreCall>>,
}

impl FakeStreamRepository {
    pub fn with_records(records: Vec<PresenceRecord>) -> Self {
        let me = Self::default();
        {
            let mut map = me.records.lock().unwrap();
            for r in records {
                map.insert(r.user_id.clone(), r);
            }
        }
        me
    }

    pub fn get(&self, user_id: &str) -> Option<PresenceRecord> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    /// Current rows ordered by user id.
    pub fn snapshot_records(&self) -> Vec<PresenceRecord> {
        let mut out: Vec<PresenceRecord> = self.records.lock().unwrap().values().cloned().collect();
        out.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        out
    }

    /// Stands in for the chat pipeline bumping the counter.
    pub fn set_parsed_messages(&self, user_id: &str, value: i64) {
        if let Some(r) = self.records.lock().unwrap().get_mut(user_id) {
            r.parsed_messages = value;
        }
    }

    pub fn fail_writes_for(&self, user_id: &str) {
        self.failing_ids.lock().unwrap().insert(user_id.to_string());
    }

    pub fn fail_list_all(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn write_fails(&self, user_id: &str) -> bool {
        self.failing_ids.lock().unwrap().contains(user_id)
    }
}

#[async_trait]
impl StreamRepository for FakeStreamRepository {
    async fn list_all(&self) -> Result<Vec<PresenceRecord>, Error> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(injected("list_all"));
        }
        Ok(self.snapshot_records())
    }

    async fn upsert(&self, record: &PresenceRecord) -> Result<(), Error> {
        self.calls.lock().unwrap().push(StoreCall::Upsert(record.user_id.clone()));
        if self.write_fails(&record.user_id) {
            return Err(injected("upsert"));
        }
        self.records.lock().unwrap().insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(StoreCall::Delete(user_id.to_string()));
        if self.write_fails(user_id) {
            return Err(injected("delete_by_user_id"));
        }
        self.records.lock().unwrap().remove(user_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helix
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ApiState {
    live: HashMap<String, LiveSnapshot>,
    always_include: Vec<LiveSnapshot>,
    fail_markers: HashSet<String>,
    error_markers: HashMap<String, String>,
    stall_markers: HashMap<String, Duration>,
    calls: Vec<Vec<String>>,
}

/// Behaviour is selected per batch: a batch "contains" a marker id when the id
/// was requested in that call.
#[derive(Default)]
pub struct FakeLiveStatusApi {
    state: Mutex<ApiState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeLiveStatusApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_live(&self, snap: LiveSnapshot) {
        self.state.lock().unwrap().live.insert(snap.user_id.clone(), snap);
    }

    pub fn set_offline(&self, user_id: &str) {
        self.state.lock().unwrap().live.remove(user_id);
    }

    /// Returned on every call regardless of the requested ids.
    pub fn always_include(&self, snap: LiveSnapshot) {
        self.state.lock().unwrap().always_include.push(snap);
    }

    pub fn fail_batches_containing(&self, user_id: &str) {
        self.state.lock().unwrap().fail_markers.insert(user_id.to_string());
    }

    pub fn error_body_for_batches_containing(&self, user_id: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .error_markers
            .insert(user_id.to_string(), message.to_string());
    }

    pub fn stall_batches_containing(&self, user_id: &str, delay: Duration) {
        self.state.lock().unwrap().stall_markers.insert(user_id.to_string(), delay);
    }

    pub fn clear_failures(&self) {
        let mut st = self.state.lock().unwrap();
        st.fail_markers.clear();
        st.error_markers.clear();
        st.stall_markers.clear();
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, user_ids: &[String]) -> Result<LiveStatusResponse, Error> {
        let (stall, fail, error_body, streams) = {
            let mut st = self.state.lock().unwrap();
            st.calls.push(user_ids.to_vec());

            let stall = user_ids.iter().filter_map(|id| st.stall_markers.get(id).copied()).max();
            let fail = user_ids.iter().any(|id| st.fail_markers.contains(id));
            let error_body = user_ids.iter().find_map(|id| st.error_markers.get(id).cloned());
            let mut streams: Vec<LiveSnapshot> =
                user_ids.iter().filter_map(|id| st.live.get(id).cloned()).collect();
            streams.extend(st.always_include.iter().cloned());
            (stall, fail, error_body, streams)
        };

        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(injected("get_live_status"));
        }
        if let Some(message) = error_body {
            return Ok(LiveStatusResponse {
                streams: Vec::new(),
                error_message: Some(message),
            });
        }
        Ok(LiveStatusResponse {
            streams,
            error_message: None,
        })
    }
}

#[async_trait]
impl LiveStatusApi for FakeLiveStatusApi {
    async fn get_live_status(&self, user_ids: &[String]) -> Result<LiveStatusResponse, Error> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = self.respond(user_ids).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
