use serde::{Deserialize, Serialize};

/// A bot-managed channel row. `id` is the broadcaster's Twitch user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub is_enabled: bool,
    pub is_banned: bool,
}

impl ChannelRecord {
    /// Enabled and not banned.
    pub fn is_trackable(&self) -> bool {
        self.is_enabled && !self.is_banned
    }
}
