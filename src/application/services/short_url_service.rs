//! Short URL creation, lookup, pagination and deletion.

use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl, User};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::utils::pagination::{Page, page_offset};
use crate::utils::slug::generate_slug;

/// Attempts before giving up on finding a free random slug.
const MAX_SLUG_ATTEMPTS: usize = 10;

/// Service for managing a user's short URLs.
pub struct ShortUrlService {
    short_urls: Arc<dyn ShortUrlRepository>,
}

impl ShortUrlService {
    pub fn new(short_urls: Arc<dyn ShortUrlRepository>) -> Self {
        Self { short_urls }
    }

    /// Creates a short URL with a fresh random slug.
    ///
    /// The slug space is small (65536 values), so insertion retries with a
    /// new slug on a uniqueness conflict instead of checking first; the
    /// database stays the single arbiter of uniqueness.
    pub async fn create_for_owner(
        &self,
        owner_id: i64,
        full_url: String,
    ) -> Result<ShortUrl, AppError> {
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let new_short_url = NewShortUrl {
                owner_id,
                full_url: full_url.clone(),
                slug: generate_slug(),
            };

            match self.short_urls.create(new_short_url).await {
                Err(AppError::Conflict(_)) => continue,
                other => return other,
            }
        }

        Err(AppError::Internal(
            "Failed to generate a unique slug".to_string(),
        ))
    }

    /// Fetches one page of an owner's short URLs, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for page numbers below 1 and for empty
    /// pages past the first, mirroring how out-of-range pages render.
    pub async fn page_for_owner(
        &self,
        owner_id: i64,
        number: i64,
        per_page: i64,
    ) -> Result<Page<ShortUrl>, AppError> {
        if number < 1 {
            return Err(AppError::NotFound);
        }

        let items = self
            .short_urls
            .list_by_owner(owner_id, per_page, page_offset(number, per_page))
            .await?;

        // The first page may be empty; it renders an empty-state message.
        if items.is_empty() && number > 1 {
            return Err(AppError::NotFound);
        }

        let total = self.short_urls.count_by_owner(owner_id).await?;
        Ok(Page::new(number, total, per_page, items))
    }

    /// Looks up a short URL by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ShortUrl, AppError> {
        self.short_urls
            .find_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Resolves a slug for redirecting, counting the click atomically.
    pub async fn follow(&self, slug: &str) -> Result<String, AppError> {
        self.short_urls
            .record_click(slug)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Looks up a short URL for management by `requester`.
    ///
    /// Records the requester may not manage are reported as absent rather
    /// than forbidden, so slugs cannot be probed for existence.
    pub async fn get_managed_by_slug(
        &self,
        slug: &str,
        requester: &User,
    ) -> Result<ShortUrl, AppError> {
        let short_url = self.get_by_slug(slug).await?;

        if !short_url.manageable_by(requester) {
            return Err(AppError::NotFound);
        }

        Ok(short_url)
    }

    /// Deletes a short URL on behalf of `requester`.
    pub async fn delete(&self, slug: &str, requester: &User) -> Result<(), AppError> {
        let short_url = self.get_managed_by_slug(slug, requester).await?;

        if !self.short_urls.delete(short_url.id).await? {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
