// streamwatch-core/src/repositories/postgres/channel.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use streamwatch_common::error::Error;
use streamwatch_common::models::ChannelRecord;
use streamwatch_common::traits::repository_traits::ChannelRepository;

#[derive(Clone)]
pub struct PostgresChannelRepository {
    pool: Pool<Postgres>,
}

impl PostgresChannelRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PostgresChannelRepository {
    async fn list_trackable_channels(&self) -> Result<Vec<ChannelRecord>, Error> {
        let q = r#"
            SELECT "id", "isEnabled", "isBanned"
            FROM channels
            WHERE "isEnabled" = TRUE
              AND "isBanned" = FALSE
        "#;
        let rows = sqlx::query(q)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(ChannelRecord {
                id:         r.try_get("id")?,
                is_enabled: r.try_get("isEnabled")?,
                is_banned:  r.try_get("isBanned")?,
            });
        }
        Ok(out)
    }
}
