//! src/eventbus/mod.rs
//!
//! Topic publishers for stream lifecycle events. `EventBus` fans messages out
//! in-process to bounded MPSC subscribers; `RedisPublisher` forwards them to
//! Redis pub/sub for consumers in other processes.

pub mod redis_publisher;

pub use redis_publisher::RedisPublisher;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::Error;
use streamwatch_common::traits::api::EventPublisher;

/// One published message as seen by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

struct Subscriber {
    topic: Option<String>,
    tx: mpsc::Sender<BusMessage>,
}

impl Subscriber {
    fn wants(&self, topic: &str) -> bool {
        self.topic.as_deref().is_none_or(|t| t == topic)
    }
}

/// In-process bus. Publishing never waits on a subscriber: a full queue is
/// reported as an error for that message, a dropped receiver is unsubscribed.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 10000;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new, empty event bus.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Receives every topic.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BusMessage> {
        self.add_subscriber(None, buffer_size).await
    }

    /// Receives only messages published on `topic`.
    pub async fn subscribe_topic(&self, topic: &str, buffer_size: Option<usize>) -> mpsc::Receiver<BusMessage> {
        self.add_subscriber(Some(topic.to_string()), buffer_size).await
    }

    async fn add_subscriber(&self, topic: Option<String>, buffer_size: Option<usize>) -> mpsc::Receiver<BusMessage> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(Subscriber { topic, tx });
        rx
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error> {
        if self.is_shutdown() {
            return Err(Error::EventBus(format!("bus is shut down; dropped '{}'", topic)));
        }

        let msg = BusMessage {
            topic: topic.to_string(),
            payload,
        };

        let mut subs = self.subscribers.lock().await;
        let mut full = 0usize;
        subs.retain(|s| {
            if !s.wants(topic) {
                return true;
            }
            match s.tx.try_send(msg.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    full += 1;
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Dropping closed subscriber for topic filter {:?}", s.topic);
                    false
                }
            }
        });

        if full > 0 {
            warn!("{} subscriber(s) full; '{}' not delivered to them", full, topic);
            return Err(Error::EventBus(format!("{} subscriber queue(s) full for '{}'", full, topic)));
        }
        Ok(())
    }
}
