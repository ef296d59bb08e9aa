//! PostgreSQL implementation of the short URL repository.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::{AppError, is_unique_violation};

const SHORT_URL_COLUMNS: &str =
    "id, owner_id, full_url, clicks, slug, created_at, updated_at";

/// PostgreSQL repository for short URLs.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let sql = format!(
            "INSERT INTO short_urls (owner_id, full_url, slug) VALUES ($1, $2, $3) \
             RETURNING {SHORT_URL_COLUMNS}"
        );

        sqlx::query_as::<_, ShortUrl>(&sql)
            .bind(new_short_url.owner_id)
            .bind(&new_short_url.full_url)
            .bind(&new_short_url.slug)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "short_urls_slug_key") {
                    AppError::Conflict("Slug already exists.".to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("SELECT {SHORT_URL_COLUMNS} FROM short_urls WHERE slug = $1");

        Ok(sqlx::query_as::<_, ShortUrl>(&sql)
            .bind(slug)
            .fetch_optional(self.pool.as_ref())
            .await?)
    }

    async fn record_click(&self, slug: &str) -> Result<Option<String>, AppError> {
        // Single statement so concurrent redirects never lose a click.
        Ok(sqlx::query_scalar::<_, String>(
            "UPDATE short_urls SET clicks = clicks + 1, updated_at = now() \
             WHERE slug = $1 RETURNING full_url",
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortUrl>, AppError> {
        let sql = format!(
            "SELECT {SHORT_URL_COLUMNS} FROM short_urls WHERE owner_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );

        Ok(sqlx::query_as::<_, ShortUrl>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?)
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_urls WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(self.pool.as_ref())
                .await?,
        )
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_urls")
            .fetch_one(self.pool.as_ref())
            .await?)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM short_urls")
                .fetch_one(self.pool.as_ref())
                .await?,
        )
    }
}
