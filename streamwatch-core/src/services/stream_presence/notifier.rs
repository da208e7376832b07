// streamwatch-core/src/services/stream_presence/notifier.rs

use std::sync::Arc;
use tracing::debug;

use crate::Error;
use streamwatch_common::models::{
    StreamOfflineMessage, StreamOnlineMessage, STREAM_OFFLINE_TOPIC, STREAM_ONLINE_TOPIC,
};
use streamwatch_common::traits::api::EventPublisher;

/// Serializes lifecycle transitions and hands them to the configured publisher.
/// Nothing here retries; callers log failures and move on.
#[derive(Clone)]
pub struct StreamNotifier {
    publisher: Arc<dyn EventPublisher>,
}

impl StreamNotifier {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn stream_online(&self, stream_id: &str, channel_id: &str) -> Result<(), Error> {
        let payload = serde_json::to_vec(&StreamOnlineMessage {
            stream_id: stream_id.to_string(),
            channel_id: channel_id.to_string(),
        })?;
        debug!("Publishing {} for channel {}", STREAM_ONLINE_TOPIC, channel_id);
        self.publisher.publish(STREAM_ONLINE_TOPIC, payload).await
    }

    pub async fn stream_offline(&self, channel_id: &str) -> Result<(), Error> {
        let payload = serde_json::to_vec(&StreamOfflineMessage {
            channel_id: channel_id.to_string(),
        })?;
        debug!("Publishing {} for channel {}", STREAM_OFFLINE_TOPIC, channel_id);
        self.publisher.publish(STREAM_OFFLINE_TOPIC, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventbus::EventBus;

    #[tokio::test]
    async fn test_online_message_shape() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(4)).await;
        let notifier = StreamNotifier::new(Arc::new(bus));

        notifier.stream_online("s1", "B").await.unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "stream.online");
        let body: serde_json::Value = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(body, serde_json::json!({"streamId": "s1", "channelId": "B"}));
    }

    #[tokio::test]
    async fn test_offline_message_shape() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(4)).await;
        let notifier = StreamNotifier::new(Arc::new(bus));

        notifier.stream_offline("A").await.unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "stream.offline");
        let body: serde_json::Value = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(body, serde_json::json!({"channelId": "A"}));
    }
}
