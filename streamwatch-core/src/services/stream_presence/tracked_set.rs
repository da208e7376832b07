// streamwatch-core/src/services/stream_presence/tracked_set.rs

use std::collections::BTreeSet;
use tracing::debug;

use crate::Error;
use streamwatch_common::traits::repository_traits::{ChannelRepository, IntegrationRepository};

/// Broadcaster ids to poll this cycle: every enabled, non-banned channel plus the
/// extra ids that Discord guilds with live notifications asked to watch.
///
/// A missing Discord integration or a link without guilds contributes nothing.
/// Read errors abort the cycle.
pub async fn resolve_tracked_set(
    channels: &dyn ChannelRepository,
    integrations: &dyn IntegrationRepository,
) -> Result<BTreeSet<String>, Error> {
    let mut tracked: BTreeSet<String> = channels
        .list_trackable_channels()
        .await?
        .into_iter()
        .filter(|c| c.is_trackable() && !c.id.is_empty())
        .map(|c| c.id)
        .collect();

    let channel_count = tracked.len();

    let Some(integration_id) = integrations.find_discord_integration_id().await? else {
        debug!("No Discord integration configured; tracking {} channel(s)", channel_count);
        return Ok(tracked);
    };

    for link in integrations.list_channel_integrations(&integration_id).await? {
        let Some(data) = link.data else { continue };
        for guild in data.guilds.iter().filter(|g| g.live_notification_enabled) {
            tracked.extend(
                guild
                    .additional_users_ids_for_live_check
                    .iter()
                    .filter(|id| !id.is_empty())
                    .cloned(),
            );
        }
    }

    debug!(
        "Tracked set resolved: {} channel(s), {} total after Discord additions",
        channel_count,
        tracked.len()
    );
    Ok(tracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fakes::{FakeChannelRepository, FakeIntegrationRepository};
    use streamwatch_common::models::{DiscordGuildSettings, DiscordIntegrationData, IntegrationRecord};

    fn guild(id: &str, enabled: bool, extra: &[&str]) -> DiscordGuildSettings {
        DiscordGuildSettings {
            id: id.to_string(),
            live_notification_enabled: enabled,
            additional_users_ids_for_live_check: extra.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn link(id: &str, guilds: Vec<DiscordGuildSettings>) -> IntegrationRecord {
        IntegrationRecord {
            id: id.to_string(),
            channel_id: format!("owner-{id}"),
            data: Some(DiscordIntegrationData { guilds }),
        }
    }

    #[tokio::test]
    async fn test_enabled_channels_only() {
        let channels = FakeChannelRepository::with_channels(&[("1", true, false), ("2", true, true), ("3", false, false)]);
        let integrations = FakeIntegrationRepository::absent();

        let set = resolve_tracked_set(&channels, &integrations).await.unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_additional_ids_are_deduplicated() {
        let channels = FakeChannelRepository::with_channels(&[("42", true, false)]);
        let integrations = FakeIntegrationRepository::with_links(vec![
            link("a", vec![guild("g1", true, &["42", "7"])]),
            link("b", vec![guild("g2", true, &["42"])]),
        ]);

        let set = resolve_tracked_set(&channels, &integrations).await.unwrap();
        assert_eq!(set.iter().filter(|id| id.as_str() == "42").count(), 1);
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_guild_without_live_notifications_is_ignored() {
        let channels = FakeChannelRepository::with_channels(&[]);
        let integrations = FakeIntegrationRepository::with_links(vec![link(
            "a",
            vec![guild("g1", false, &["9"]), guild("g2", true, &["10"])],
        )]);

        let set = resolve_tracked_set(&channels, &integrations).await.unwrap();
        assert!(!set.contains("9"));
        assert!(set.contains("10"));
    }

    #[tokio::test]
    async fn test_links_without_guilds_or_data_are_tolerated() {
        let channels = FakeChannelRepository::with_channels(&[("1", true, false)]);
        let mut no_data = link("b", vec![]);
        no_data.data = None;
        let integrations = FakeIntegrationRepository::with_links(vec![link("a", vec![]), no_data]);

        let set = resolve_tracked_set(&channels, &integrations).await.unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_channel_read_error_aborts() {
        let channels = FakeChannelRepository::failing();
        let integrations = FakeIntegrationRepository::absent();
        assert!(resolve_tracked_set(&channels, &integrations).await.is_err());
    }
}
