//! Business logic services orchestrating repositories.

pub mod auth_service;
pub mod short_url_service;

pub use auth_service::AuthService;
pub use short_url_service::ShortUrlService;
