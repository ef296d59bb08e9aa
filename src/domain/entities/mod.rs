//! Core business entities.

pub mod short_url;
pub mod user;

pub use short_url::{NewShortUrl, ShortUrl};
pub use user::{NewUser, User};
