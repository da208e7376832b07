pub mod channel;
pub mod event;
pub mod integration;
pub mod stream;

pub use channel::ChannelRecord;
pub use event::{StreamOfflineMessage, StreamOnlineMessage, STREAM_OFFLINE_TOPIC, STREAM_ONLINE_TOPIC};
pub use integration::{DiscordGuildSettings, DiscordIntegrationData, IntegrationRecord};
pub use stream::{LiveSnapshot, PresenceRecord, Transition};
