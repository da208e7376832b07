// File: streamwatch-core/src/platforms/twitch/client.rs

use reqwest::Client as ReqwestClient;
use crate::platforms::twitch::auth::AppTokenProvider;

pub const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Entry point for Helix calls made with an app access token.
/// Endpoint-specific calls live under `requests::*`.
pub struct TwitchHelixClient {
    http: ReqwestClient,
    auth: AppTokenProvider,
    base_url: String,
}

impl TwitchHelixClient {
    /// - `client_id` / `client_secret`: the registered application's credentials
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let http = ReqwestClient::new();
        let auth = AppTokenProvider::new(http.clone(), client_id, client_secret);
        Self::with_parts(http, auth, HELIX_BASE_URL)
    }

    /// Builds a client against a different Helix root (e.g. a local mock).
    pub fn with_parts(http: ReqwestClient, auth: AppTokenProvider, base_url: &str) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn client_id(&self) -> &str {
        self.auth.client_id()
    }

    pub fn auth(&self) -> &AppTokenProvider {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &ReqwestClient {
        &self.http
    }
}
