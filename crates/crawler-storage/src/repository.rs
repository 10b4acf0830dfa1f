use crate::error::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use crawler_types::ContentRecord;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Relational store of content metadata rows.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<ContentRecord>>;

    /// Insert a new row. Returns `StorageError::DuplicateUrl` if the URL's
    /// unique constraint is violated (first-writer-wins under a race).
    async fn insert(
        &self,
        content_uuid: Uuid,
        source: &str,
        url: &str,
        title: &str,
        author: Option<&str>,
        published_at: Option<chrono::DateTime<Utc>>,
        body_ref: &str,
    ) -> Result<ContentRecord, StorageError>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<ContentRecord>>;

    async fn list(&self, skip: i64, limit: i64, source: Option<&str>) -> anyhow::Result<Vec<ContentRecord>>;
}

pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<ContentRecord, sqlx::Error> {
    Ok(ContentRecord {
        id: row.try_get("id")?,
        content_uuid: row.try_get("content_uuid")?,
        source: row.try_get("source")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        body_ref: row.try_get("body_ref")?,
    })
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    #[instrument(skip(self))]
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<ContentRecord>> {
        let row = sqlx::query("SELECT * FROM content WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose().map_err(Into::into)
    }

    #[instrument(skip(self, title, author))]
    async fn insert(
        &self,
        content_uuid: Uuid,
        source: &str,
        url: &str,
        title: &str,
        author: Option<&str>,
        published_at: Option<chrono::DateTime<Utc>>,
        body_ref: &str,
    ) -> Result<ContentRecord, StorageError> {
        let row = sqlx::query(
            "INSERT INTO content (content_uuid, source, url, title, author, published_at, created_at, body_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(content_uuid)
        .bind(source)
        .bind(url)
        .bind(title)
        .bind(author)
        .bind(published_at)
        .bind(Utc::now())
        .bind(body_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.is_unique_violation() {
                    debug!(url, "duplicate url on insert");
                    return StorageError::DuplicateUrl;
                }
            }
            error!(%err, url, "database insert failed");
            StorageError::Database(err.to_string())
        })?;

        row_to_record(&row).map_err(|err| StorageError::Database(err.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<ContentRecord>> {
        let row = sqlx::query("SELECT * FROM content WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose().map_err(Into::into)
    }

    async fn list(&self, skip: i64, limit: i64, source: Option<&str>) -> anyhow::Result<Vec<ContentRecord>> {
        let rows = if let Some(source) = source {
            sqlx::query("SELECT * FROM content WHERE source = $1 ORDER BY id OFFSET $2 LIMIT $3")
                .bind(source)
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query("SELECT * FROM content ORDER BY id OFFSET $1 LIMIT $2")
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        };
        rows.iter().map(row_to_record).collect::<Result<_, _>>().map_err(Into::into)
    }
}
