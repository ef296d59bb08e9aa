//! Repository trait for user account data access.

use async_trait::async_trait;

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;

/// Repository interface for managing user accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is already taken and
    /// [`AppError::Database`] on other database errors.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds an account by primary key.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Finds an account by username regardless of its active flag.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Finds an account by username, restricted to `is_active = true`.
    ///
    /// Login goes through this lookup so deactivated accounts cannot sign in.
    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Sets the active flag, returning `false` when no such account exists.
    async fn set_active(&self, id: i64, active: bool) -> Result<bool, AppError>;

    /// Sets the staff flag, returning `false` when no such account exists.
    async fn set_staff(&self, id: i64, staff: bool) -> Result<bool, AppError>;

    /// Lists all accounts ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Counts all accounts.
    async fn count(&self) -> Result<i64, AppError>;
}
