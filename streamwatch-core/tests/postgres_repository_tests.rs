// tests/postgres_repository_tests.rs
//
// Needs a reachable Postgres (TEST_DATABASE_URL / DATABASE_ADMIN_URL);
// run with `--ignored`.

use streamwatch_core::repositories::{
    PostgresChannelRepository, PostgresIntegrationRepository, PostgresStreamRepository,
};
use streamwatch_core::test_utils::fakes::snapshot;
use streamwatch_core::test_utils::helpers::setup_test_database;
use streamwatch_core::Error;
use streamwatch_common::models::PresenceRecord;
use streamwatch_common::traits::repository_traits::{
    ChannelRepository, IntegrationRepository, StreamRepository,
};

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_list_trackable_channels_filters_flags() -> Result<(), Error> {
    let db = setup_test_database().await?;
    sqlx::query(
        r#"INSERT INTO channels ("id", "isEnabled", "isBanned")
           VALUES ('1', TRUE, FALSE), ('2', TRUE, TRUE), ('3', FALSE, FALSE)"#,
    )
    .execute(db.pool())
    .await?;

    let repo = PostgresChannelRepository::new(db.pool().clone());
    let channels = repo.list_trackable_channels().await?;
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id, "1");
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_discord_links_are_read_from_json() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresIntegrationRepository::new(db.pool().clone());
    assert!(repo.find_discord_integration_id().await?.is_none());

    sqlx::query(r#"INSERT INTO channels ("id") VALUES ('1'), ('2')"#)
        .execute(db.pool())
        .await?;
    sqlx::query(r#"INSERT INTO integrations ("id", "service") VALUES ('int-discord', 'DISCORD')"#)
        .execute(db.pool())
        .await?;
    sqlx::query(
        r#"INSERT INTO channels_integrations ("id", "channelId", "integrationId", "data") VALUES
           ('ci-1', '1', 'int-discord',
            '{"discord":{"guilds":[{"id":"g1","liveNotificationEnabled":true,"additionalUsersIdsForLiveCheck":["77"]}]}}'),
           ('ci-2', '2', 'int-discord', NULL)"#,
    )
    .execute(db.pool())
    .await?;

    let id = repo.find_discord_integration_id().await?.expect("integration exists");
    let mut links = repo.list_channel_integrations(&id).await?;
    links.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(links.len(), 2);
    let guilds = &links[0].data.as_ref().expect("discord data").guilds;
    assert!(guilds[0].live_notification_enabled);
    assert_eq!(guilds[0].additional_users_ids_for_live_check, vec!["77".to_string()]);
    assert!(links[1].data.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_stream_upsert_keeps_parsed_messages() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresStreamRepository::new(db.pool().clone());

    let first = PresenceRecord::from_snapshot(&snapshot("s1", "42"), None);
    repo.upsert(&first).await?;

    sqlx::query(r#"UPDATE channels_streams SET "parsedMessages" = 42 WHERE "userId" = '42'"#)
        .execute(db.pool())
        .await?;

    let second = PresenceRecord::from_snapshot(&snapshot("s2", "42"), None);
    repo.upsert(&second).await?;

    let stored = repo.get_by_user_id("42").await?.expect("row exists");
    assert_eq!(stored.id, "s2");
    assert_eq!(stored.parsed_messages, 42);
    assert_eq!(stored.tags, vec!["English".to_string()]);

    assert_eq!(repo.list_all().await?.len(), 1);

    repo.delete_by_user_id("42").await?;
    assert!(repo.get_by_user_id("42").await?.is_none());
    Ok(())
}
