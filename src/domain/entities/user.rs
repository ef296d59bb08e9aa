//! User account entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A registered account.
///
/// `password_hash` holds an Argon2 PHC string and is nullable so accounts can
/// be provisioned before a password is set (e.g. via the admin CLI).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: Option<String>,
}
