// streamwatch-core/src/eventbus/redis_publisher.rs

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info};

use crate::Error;
use streamwatch_common::traits::api::EventPublisher;

/// Publishes to Redis pub/sub channels named after the topic.
/// `ConnectionManager` reconnects on its own; a failed PUBLISH is surfaced to
/// the caller and not retried.
#[derive(Clone)]
pub struct RedisPublisher {
    conn: ConnectionManager,
}

impl RedisPublisher {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid Redis URL: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::EventBus(format!("Redis connect failed: {e}")))?;
        info!("Connected to Redis for event publishing");
        Ok(Self { conn })
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(topic, payload)
            .await
            .map_err(|e| Error::EventBus(format!("Redis PUBLISH '{}' failed: {}", topic, e)))?;
        debug!("Published '{}' to {} Redis subscriber(s)", topic, receivers);
        Ok(())
    }
}
