use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live-status data for one broadcaster as reported by Helix at fetch time.
/// Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    /// Helix stream (session) id.
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    /// e.g. "live"
    pub stream_type: String,
    pub title: String,
    pub viewer_count: i64,
    pub started_at: DateTime<Utc>,
    pub language: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub is_mature: bool,
}

/// Persisted "currently live" state, one row per `user_id`.
/// A missing row means the broadcaster is known to be offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    pub stream_type: String,
    pub title: String,
    pub viewer_count: i64,
    pub started_at: DateTime<Utc>,
    pub language: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub is_mature: bool,
    /// Maintained by the chat pipeline; carried forward on every overwrite.
    pub parsed_messages: i64,
}

impl PresenceRecord {
    /// Builds the next record for `snapshot`, carrying `parsed_messages` over
    /// from `previous` when one exists.
    pub fn from_snapshot(snapshot: &LiveSnapshot, previous: Option<&PresenceRecord>) -> Self {
        Self {
            id: snapshot.id.clone(),
            user_id: snapshot.user_id.clone(),
            user_login: snapshot.user_login.clone(),
            user_name: snapshot.user_name.clone(),
            game_id: snapshot.game_id.clone(),
            game_name: snapshot.game_name.clone(),
            stream_type: snapshot.stream_type.clone(),
            title: snapshot.title.clone(),
            viewer_count: snapshot.viewer_count,
            started_at: snapshot.started_at,
            language: snapshot.language.clone(),
            thumbnail_url: snapshot.thumbnail_url.clone(),
            tags: snapshot.tags.clone(),
            is_mature: snapshot.is_mature,
            parsed_messages: previous.map(|p| p.parsed_messages).unwrap_or(0),
        }
    }
}

/// Outcome of comparing snapshot existence with record existence for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Live now, no record before.
    Started,
    /// Live now and already recorded.
    Continuing,
    /// Recorded before, not live now.
    Ended,
    /// Neither.
    Absent,
}

impl Transition {
    pub fn classify(snapshot_exists: bool, record_exists: bool) -> Self {
        match (snapshot_exists, record_exists) {
            (true, false) => Transition::Started,
            (true, true) => Transition::Continuing,
            (false, true) => Transition::Ended,
            (false, false) => Transition::Absent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Started => "started",
            Transition::Continuing => "continuing",
            Transition::Ended => "ended",
            Transition::Absent => "absent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(id: &str, user_id: &str) -> LiveSnapshot {
        LiveSnapshot {
            id: id.to_string(),
            user_id: user_id.to_string(),
            user_login: "login".into(),
            user_name: "Name".into(),
            game_id: "509658".into(),
            game_name: "Just Chatting".into(),
            stream_type: "live".into(),
            title: "hello".into(),
            viewer_count: 10,
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            language: "en".into(),
            thumbnail_url: "https://example.invalid/{width}x{height}.jpg".into(),
            tags: vec!["English".into()],
            is_mature: false,
        }
    }

    #[test]
    fn classify_covers_all_four_cases() {
        assert_eq!(Transition::classify(true, false), Transition::Started);
        assert_eq!(Transition::classify(true, true), Transition::Continuing);
        assert_eq!(Transition::classify(false, true), Transition::Ended);
        assert_eq!(Transition::classify(false, false), Transition::Absent);
    }

    #[test]
    fn from_snapshot_without_previous_starts_counter_at_zero() {
        let rec = PresenceRecord::from_snapshot(&snapshot("s1", "42"), None);
        assert_eq!(rec.parsed_messages, 0);
        assert_eq!(rec.id, "s1");
        assert_eq!(rec.user_id, "42");
    }

    #[test]
    fn from_snapshot_keeps_counter_across_new_session() {
        let mut old = PresenceRecord::from_snapshot(&snapshot("s1", "42"), None);
        old.parsed_messages = 42;
        let rec = PresenceRecord::from_snapshot(&snapshot("s2", "42"), Some(&old));
        assert_eq!(rec.id, "s2");
        assert_eq!(rec.parsed_messages, 42);
    }
}
