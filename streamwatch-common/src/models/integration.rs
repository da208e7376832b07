use serde::{Deserialize, Serialize};

/// One channel's link to the Discord integration. `data` is the raw JSON column;
/// it may be missing or carry no `discord` section at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: String,
    pub channel_id: String,
    pub data: Option<DiscordIntegrationData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordIntegrationData {
    #[serde(default)]
    pub guilds: Vec<DiscordGuildSettings>,
}

/// Per-guild notification settings as stored in `channels_integrations.data -> 'discord'`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordGuildSettings {
    pub id: String,
    #[serde(default)]
    pub live_notification_enabled: bool,
    #[serde(default)]
    pub additional_users_ids_for_live_check: Vec<String>,
}
