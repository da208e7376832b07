// File: streamwatch-core/src/platforms/twitch/auth.rs
//
// App access tokens via the OAuth client-credentials grant. The token is cached
// and re-requested shortly before it expires or after Helix rejects it.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::Error;

pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Matches Twitch's JSON from the token endpoint
#[derive(Debug, Deserialize)]
struct TwitchAppTokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl AppToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

pub struct AppTokenProvider {
    http: ReqwestClient,
    client_id: String,
    client_secret: String,
    token_url: String,
    cached: Mutex<Option<AppToken>>,
}

impl AppTokenProvider {
    pub fn new(http: ReqwestClient, client_id: &str, client_secret: &str) -> Self {
        Self::with_token_url(http, client_id, client_secret, TWITCH_TOKEN_URL)
    }

    pub fn with_token_url(http: ReqwestClient, client_id: &str, client_secret: &str, token_url: &str) -> Self {
        Self {
            http,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: token_url.to_string(),
            cached: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns a cached token, requesting a new one when missing or near expiry.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut guard = self.cached.lock().await;
        if let Some(tok) = guard.as_ref() {
            if tok.is_fresh(Utc::now()) {
                return Ok(tok.access_token.clone());
            }
            debug!("Cached app access token expires at {}; requesting a new one", tok.expires_at);
        }

        let tok = self.request_token().await?;
        let access = tok.access_token.clone();
        *guard = Some(tok);
        Ok(access)
    }

    /// Drops the cached token so the next call requests a fresh one.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self) -> Result<AppToken, Error> {
        let params = [
            ("client_id",     self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type",    "client_credentials"),
        ];

        let resp = self.http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("HTTP error requesting app token: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Auth(format!("Twitch token endpoint error: {e}")))?
            .json::<TwitchAppTokenResponse>()
            .await
            .map_err(|e| Error::Auth(format!("Parse error on token JSON: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(resp.expires_in);
        info!("Obtained Twitch app access token (expires at {})", expires_at);
        Ok(AppToken {
            access_token: resp.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_near_expiry_is_not_fresh() {
        let now = Utc::now();
        let tok = AppToken {
            access_token: "t".into(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(!tok.is_fresh(now));

        let tok = AppToken {
            access_token: "t".into(),
            expires_at: now + Duration::hours(1),
        };
        assert!(tok.is_fresh(now));
    }

    #[test]
    fn parses_client_credentials_response() {
        let body = r#"{"access_token":"abc","expires_in":5011271,"token_type":"bearer"}"#;
        let parsed: TwitchAppTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 5011271);
    }
}
