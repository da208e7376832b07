// streamwatch-core/src/config.rs

use std::time::Duration;
use streamwatch_common::traits::api::MAX_LIVE_STATUS_BATCH;

pub const PRODUCTION_ENV: &str = "production";

/// Settings for the stream presence loop, injected by the host process.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// `"production"` selects `production_interval`; anything else selects
    /// `development_interval`.
    pub app_env: String,
    pub production_interval: Duration,
    pub development_interval: Duration,
    /// Ids per upstream call, clamped to `1..=MAX_LIVE_STATUS_BATCH`.
    pub batch_size: usize,
    /// Upper bound on a single batch fetch; an expired batch counts as failed.
    pub fetch_timeout: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            production_interval: Duration::from_secs(5 * 60),
            development_interval: Duration::from_secs(15),
            batch_size: MAX_LIVE_STATUS_BATCH,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl PresenceConfig {
    pub fn is_production(&self) -> bool {
        self.app_env == PRODUCTION_ENV
    }

    pub fn tick_interval(&self) -> Duration {
        if self.is_production() {
            self.production_interval
        } else {
            self.development_interval
        }
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_LIVE_STATUS_BATCH)
    }
}
