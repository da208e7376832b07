use async_trait::async_trait;
use crate::error::Error;
use crate::models::{ChannelRecord, IntegrationRecord, PresenceRecord};

/// Read side of the `channels` table.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Channels with `isEnabled = true` and `isBanned = false`.
    async fn list_trackable_channels(&self) -> Result<Vec<ChannelRecord>, Error>;
}

/// Read side of `integrations` / `channels_integrations`.
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// Id of the Discord integration row, `None` if it was never created.
    async fn find_discord_integration_id(&self) -> Result<Option<String>, Error>;

    /// Every channel link to the given integration.
    async fn list_channel_integrations(&self, integration_id: &str) -> Result<Vec<IntegrationRecord>, Error>;
}

/// Last-known live state per broadcaster, keyed by `user_id`.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<PresenceRecord>, Error>;

    /// Insert or overwrite the row for `record.user_id`.
    async fn upsert(&self, record: &PresenceRecord) -> Result<(), Error>;

    async fn delete_by_user_id(&self, user_id: &str) -> Result<(), Error>;
}
