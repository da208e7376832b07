// streamwatch-core/src/repositories/postgres/stream.rs
//
// One row per live broadcaster in `channels_streams`, keyed by "userId".
// "parsedMessages" is owned by the chat pipeline: it is written on insert and
// left untouched when an existing row is overwritten.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use streamwatch_common::error::Error;
use streamwatch_common::models::PresenceRecord;
use streamwatch_common::traits::repository_traits::StreamRepository;

#[derive(Clone)]
pub struct PostgresStreamRepository {
    pool: Pool<Postgres>,
}

impl PostgresStreamRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<PresenceRecord>, Error> {
        let q = r#"
            SELECT "id", "userId", "userLogin", "userName", "gameId", "gameName", "type",
                   "title", "viewerCount", "startedAt", "language", "thumbnailUrl",
                   "tags", "isMature", "parsedMessages"
            FROM channels_streams
            WHERE "userId" = $1
        "#;
        let row_opt = sqlx::query(q)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row_opt.map(|r| row_to_record(&r)).transpose()
    }
}

fn row_to_record(r: &PgRow) -> Result<PresenceRecord, Error> {
    let started_at: DateTime<Utc> = r.try_get("startedAt")?;
    Ok(PresenceRecord {
        id:              r.try_get("id")?,
        user_id:         r.try_get("userId")?,
        user_login:      r.try_get("userLogin")?,
        user_name:       r.try_get("userName")?,
        game_id:         r.try_get("gameId")?,
        game_name:       r.try_get("gameName")?,
        stream_type:     r.try_get("type")?,
        title:           r.try_get("title")?,
        viewer_count:    r.try_get("viewerCount")?,
        started_at,
        language:        r.try_get("language")?,
        thumbnail_url:   r.try_get("thumbnailUrl")?,
        tags:            r.try_get("tags")?,
        is_mature:       r.try_get("isMature")?,
        parsed_messages: r.try_get("parsedMessages")?,
    })
}

#[async_trait]
impl StreamRepository for PostgresStreamRepository {
    async fn list_all(&self) -> Result<Vec<PresenceRecord>, Error> {
        let q = r#"
            SELECT "id", "userId", "userLogin", "userName", "gameId", "gameName", "type",
                   "title", "viewerCount", "startedAt", "language", "thumbnailUrl",
                   "tags", "isMature", "parsedMessages"
            FROM channels_streams
        "#;
        let rows = sqlx::query(q)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn upsert(&self, record: &PresenceRecord) -> Result<(), Error> {
        let q = r#"
            INSERT INTO channels_streams (
                "id", "userId", "userLogin", "userName", "gameId", "gameName", "type",
                "title", "viewerCount", "startedAt", "language", "thumbnailUrl",
                "tags", "isMature", "parsedMessages"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT ("userId")
            DO UPDATE SET "id"           = EXCLUDED."id",
                          "userLogin"    = EXCLUDED."userLogin",
                          "userName"     = EXCLUDED."userName",
                          "gameId"       = EXCLUDED."gameId",
                          "gameName"     = EXCLUDED."gameName",
                          "type"         = EXCLUDED."type",
                          "title"        = EXCLUDED."title",
                          "viewerCount"  = EXCLUDED."viewerCount",
                          "startedAt"    = EXCLUDED."startedAt",
                          "language"     = EXCLUDED."language",
                          "thumbnailUrl" = EXCLUDED."thumbnailUrl",
                          "tags"         = EXCLUDED."tags",
                          "isMature"     = EXCLUDED."isMature"
        "#;
        sqlx::query(q)
            .bind(&record.id)
            .bind(&record.user_id)
            .bind(&record.user_login)
            .bind(&record.user_name)
            .bind(&record.game_id)
            .bind(&record.game_name)
            .bind(&record.stream_type)
            .bind(&record.title)
            .bind(record.viewer_count)
            .bind(record.started_at)
            .bind(&record.language)
            .bind(&record.thumbnail_url)
            .bind(&record.tags)
            .bind(record.is_mature)
            .bind(record.parsed_messages)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<(), Error> {
        sqlx::query(r#"DELETE FROM channels_streams WHERE "userId" = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
