use serde::{Deserialize, Serialize};

pub const STREAM_ONLINE_TOPIC: &str = "stream.online";
pub const STREAM_OFFLINE_TOPIC: &str = "stream.offline";

/// Payload of `stream.online`: `{ "streamId": ..., "channelId": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamOnlineMessage {
    pub stream_id: String,
    pub channel_id: String,
}

/// Payload of `stream.offline`: `{ "channelId": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamOfflineMessage {
    pub channel_id: String,
}
