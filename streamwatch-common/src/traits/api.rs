use async_trait::async_trait;
use crate::error::Error;
use crate::models::LiveSnapshot;

/// Maximum number of user ids Helix accepts in one `Get Streams` call.
pub const MAX_LIVE_STATUS_BATCH: usize = 100;

/// Body of one live-status call. Broadcasters that are offline are simply absent.
#[derive(Debug, Clone, Default)]
pub struct LiveStatusResponse {
    pub streams: Vec<LiveSnapshot>,
    /// Set when the upstream answered with an error body.
    pub error_message: Option<String>,
}

impl LiveStatusResponse {
    pub fn is_error(&self) -> bool {
        self.error_message.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Upstream live-status source. Callers never pass more than
/// [`MAX_LIVE_STATUS_BATCH`] ids at once.
#[async_trait]
pub trait LiveStatusApi: Send + Sync {
    async fn get_live_status(&self, user_ids: &[String]) -> Result<LiveStatusResponse, Error>;
}

/// Fire-and-forget topic publisher.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error>;
}
