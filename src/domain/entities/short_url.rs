//! ShortUrl entity mapping a slug to a stored full URL.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::User;

/// Timestamp format used when rendering records in templates.
pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// A shortened URL owned by a user.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ShortUrl {
    pub id: i64,
    pub owner_id: i64,
    pub full_url: String,
    pub clicks: i64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Whether `user` may manage (delete) this record.
    ///
    /// Staff accounts may manage any record; everyone else only their own.
    pub fn manageable_by(&self, user: &User) -> bool {
        self.owner_id == user.id || user.is_staff
    }

    /// Creation timestamp formatted for display.
    pub fn created_at_display(&self) -> String {
        self.created_at.format(DATETIME_FORMAT).to_string()
    }
}

/// Input data for creating a new short URL.
#[derive(Debug, Clone)]
pub struct NewShortUrl {
    pub owner_id: i64,
    pub full_url: String,
    pub slug: String,
}
