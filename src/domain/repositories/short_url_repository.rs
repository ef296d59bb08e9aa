//! Repository trait for short URL data access.

use async_trait::async_trait;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::error::AppError;

/// Repository interface for managing short URLs.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Creates a new short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug already exists, which the
    /// service layer treats as a signal to retry with a fresh slug.
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Finds a short URL by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Atomically increments the click counter for `slug` and returns the
    /// stored full URL, or `None` when the slug is unknown.
    async fn record_click(&self, slug: &str) -> Result<Option<String>, AppError>;

    /// Lists a page of an owner's short URLs, newest first.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortUrl>, AppError>;

    /// Counts an owner's short URLs.
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError>;

    /// Deletes a short URL, returning `false` when it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Counts all short URLs.
    async fn count(&self) -> Result<i64, AppError>;

    /// Sums the click counters across all short URLs.
    async fn total_clicks(&self) -> Result<i64, AppError>;
}
