// ========================================================
// File: streamwatch-core/src/platforms/twitch/requests/stream.rs
// ========================================================
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;
use streamwatch_common::models::LiveSnapshot;
use streamwatch_common::traits::api::{LiveStatusApi, LiveStatusResponse, MAX_LIVE_STATUS_BATCH};

/// Response from "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single stream data record.
#[derive(Debug, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    #[serde(rename = "type")]
    pub type_field: String, // e.g., "live"
    pub title: String,
    pub viewer_count: i64,
    pub started_at: DateTime<Utc>,
    pub language: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_mature: bool,
}

impl From<StreamData> for LiveSnapshot {
    fn from(s: StreamData) -> Self {
        LiveSnapshot {
            id: s.id,
            user_id: s.user_id,
            user_login: s.user_login,
            user_name: s.user_name,
            game_id: s.game_id,
            game_name: s.game_name,
            stream_type: s.type_field,
            title: s.title,
            viewer_count: s.viewer_count,
            started_at: s.started_at,
            language: s.language,
            thumbnail_url: s.thumbnail_url,
            tags: s.tags.unwrap_or_default(),
            is_mature: s.is_mature,
        }
    }
}

/// Helix error body, e.g. `{"error":"Unauthorized","status":401,"message":"Invalid OAuth token"}`.
#[derive(Debug, Deserialize, Default)]
pub struct HelixErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl HelixErrorBody {
    fn describe(&self, status: StatusCode) -> String {
        match (self.error.is_empty(), self.message.is_empty()) {
            (true, true) => format!("HTTP {}", status),
            (false, true) => format!("HTTP {} {}", status, self.error),
            (_, false) => format!("HTTP {} {}", status, self.message),
        }
    }
}

/// Builds `GET /streams?user_id=..&user_id=..&first=N`.
pub fn streams_url(base_url: &str, user_ids: &[String]) -> Result<Url, Error> {
    let mut params: Vec<(&str, &str)> = user_ids.iter().map(|id| ("user_id", id.as_str())).collect();
    let first = user_ids.len().clamp(1, MAX_LIVE_STATUS_BATCH).to_string();
    params.push(("first", first.as_str()));

    Url::parse_with_params(&format!("{}/streams", base_url), &params)
        .map_err(|e| Error::Parse(format!("invalid Helix URL: {e}")))
}

impl TwitchHelixClient {
    /// Calls "Get Streams" for up to 100 user ids. Only live broadcasters come back.
    ///
    /// A 401 drops the cached app token and retries once with a fresh one.
    /// Any other non-2xx status is returned as `error_message`.
    pub async fn fetch_streams(&self, user_ids: &[String]) -> Result<LiveStatusResponse, Error> {
        if user_ids.len() > MAX_LIVE_STATUS_BATCH {
            return Err(Error::Platform(format!(
                "fetch_streams: {} ids exceeds the Helix limit of {}",
                user_ids.len(),
                MAX_LIVE_STATUS_BATCH
            )));
        }
        if user_ids.is_empty() {
            return Ok(LiveStatusResponse::default());
        }

        let url = streams_url(self.base_url(), user_ids)?;

        let mut resp = self.send_streams_request(&url).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Helix rejected the app access token; requesting a new one");
            self.auth().invalidate().await;
            resp = self.send_streams_request(&url).await?;
        }

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let parsed: HelixErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Ok(LiveStatusResponse {
                streams: Vec::new(),
                error_message: Some(parsed.describe(status)),
            });
        }

        let parsed: StreamsResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Platform(format!("fetch_streams parse error: {}", e)))?;

        debug!("fetch_streams: {} of {} broadcasters live", parsed.data.len(), user_ids.len());

        Ok(LiveStatusResponse {
            streams: parsed.data.into_iter().map(LiveSnapshot::from).collect(),
            error_message: None,
        })
    }

    async fn send_streams_request(&self, url: &Url) -> Result<reqwest::Response, Error> {
        let token = self.auth().access_token().await?;
        self.http_client()
            .get(url.clone())
            .header("Client-Id", self.client_id())
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| Error::Platform(format!("fetch_streams network error: {}", e)))
    }
}

#[async_trait]
impl LiveStatusApi for TwitchHelixClient {
    async fn get_live_status(&self, user_ids: &[String]) -> Result<LiveStatusResponse, Error> {
        self.fetch_streams(user_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "data": [
        {
          "id": "40952121085",
          "user_id": "101051819",
          "user_login": "afro",
          "user_name": "Afro",
          "game_id": "32982",
          "game_name": "Grand Theft Auto V",
          "type": "live",
          "title": "Jacob: Digital Den Laptops & Routers | NoPixel | !MAINGEAR !FCF",
          "tags": ["English"],
          "viewer_count": 1490,
          "started_at": "2021-03-10T03:18:11Z",
          "language": "en",
          "thumbnail_url": "https://static-cdn.jtvnw.net/previews-ttv/live_user_afro-{width}x{height}.jpg",
          "tag_ids": [],
          "is_mature": false
        },
        {
          "id": "40952121086",
          "user_id": "555",
          "user_login": "quiet",
          "user_name": "Quiet",
          "game_id": "",
          "game_name": "",
          "type": "live",
          "title": "",
          "tags": null,
          "viewer_count": 0,
          "started_at": "2021-03-10T04:00:00Z",
          "language": "de",
          "thumbnail_url": "",
          "is_mature": true
        }
      ],
      "pagination": {}
    }"#;

    #[test]
    fn parses_get_streams_body_into_snapshots() {
        let parsed: StreamsResponse = serde_json::from_str(SAMPLE).unwrap();
        let snaps: Vec<LiveSnapshot> = parsed.data.into_iter().map(LiveSnapshot::from).collect();
        assert_eq!(snaps.len(), 2);

        assert_eq!(snaps[0].id, "40952121085");
        assert_eq!(snaps[0].user_id, "101051819");
        assert_eq!(snaps[0].stream_type, "live");
        assert_eq!(snaps[0].tags, vec!["English".to_string()]);
        assert_eq!(snaps[0].viewer_count, 1490);
        assert_eq!(snaps[0].started_at.to_rfc3339(), "2021-03-10T03:18:11+00:00");

        assert!(snaps[1].tags.is_empty());
        assert!(snaps[1].is_mature);
    }

    #[test]
    fn streams_url_repeats_user_id() {
        let ids = vec!["1".to_string(), "2".to_string()];
        let url = streams_url("https://api.twitch.tv/helix", &ids).unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/streams?user_id=1&user_id=2&first=2");
    }

    #[test]
    fn error_body_prefers_message() {
        let body: HelixErrorBody =
            serde_json::from_str(r#"{"error":"Too Many Requests","status":429,"message":"slow down"}"#).unwrap();
        assert_eq!(body.describe(StatusCode::TOO_MANY_REQUESTS), "HTTP 429 Too Many Requests slow down");
    }
}
