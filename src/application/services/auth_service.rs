//! Account registration, credential verification and login-state loading.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Service for managing accounts and verifying credentials.
///
/// Passwords are stored as Argon2 PHC strings; verification never reveals
/// whether the username or the password was wrong.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Hashes a plaintext password into a PHC string.
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Accounts without a password hash can never authenticate.
    pub fn verify_password(user: &User, password: &str) -> bool {
        let Some(stored) = &user.password_hash else {
            return false;
        };

        let Ok(parsed) = PasswordHash::new(stored) else {
            tracing::error!("Unparseable password hash for user {}", user.id);
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Creates a new active account with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the username is already taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password_hash = Self::hash_password(password)?;

        self.users
            .create(NewUser {
                username: username.to_string(),
                password_hash: Some(password_hash),
            })
            .await
    }

    /// Looks up an active account and checks the password.
    ///
    /// Returns `Ok(None)` for unknown usernames, inactive accounts and wrong
    /// passwords alike.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = self.users.find_active_by_username(username).await? else {
            return Ok(None);
        };

        if !Self::verify_password(&user, password) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Loads the user behind a session id.
    pub async fn load_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        self.users.find_by_id(user_id).await
    }

    /// Whether an account with this username already exists (active or not).
    pub async fn is_username_taken(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.users.find_by_username(username).await?.is_some())
    }

    /// Deactivates an account so it can no longer sign in.
    pub async fn deactivate(&self, user_id: i64) -> Result<(), AppError> {
        if !self.users.set_active(user_id, false).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
