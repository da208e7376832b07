// streamwatch-core/src/repositories/postgres/integration.rs
//
// Reads the Discord integration and every channel's link to it. The per-channel
// settings live in `channels_integrations.data -> 'discord'`; rows whose JSON does
// not match the expected shape are logged and treated as having no settings.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::warn;
use streamwatch_common::error::Error;
use streamwatch_common::models::{DiscordIntegrationData, IntegrationRecord};
use streamwatch_common::traits::repository_traits::IntegrationRepository;

/// Value of `integrations.service` for the Discord integration.
pub const DISCORD_SERVICE: &str = "DISCORD";

#[derive(Clone)]
pub struct PostgresIntegrationRepository {
    pool: Pool<Postgres>,
}

impl PostgresIntegrationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrationRepository for PostgresIntegrationRepository {
    async fn find_discord_integration_id(&self) -> Result<Option<String>, Error> {
        let row_opt = sqlx::query(r#"SELECT "id" FROM integrations WHERE "service" = $1"#)
            .bind(DISCORD_SERVICE)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(r.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn list_channel_integrations(&self, integration_id: &str) -> Result<Vec<IntegrationRecord>, Error> {
        let q = r#"
            SELECT "id", "channelId", "data" -> 'discord' AS discord
            FROM channels_integrations
            WHERE "integrationId" = $1
        "#;
        let rows = sqlx::query(q)
            .bind(integration_id)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let id: String = r.try_get("id")?;
            let raw: Option<serde_json::Value> = r.try_get("discord")?;
            let data = match raw {
                Some(serde_json::Value::Null) | None => None,
                Some(v) => match serde_json::from_value::<DiscordIntegrationData>(v) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        warn!("Ignoring malformed discord data on channels_integrations id={}: {}", id, e);
                        None
                    }
                },
            };
            out.push(IntegrationRecord {
                id,
                channel_id: r.try_get("channelId")?,
                data,
            });
        }
        Ok(out)
    }
}
