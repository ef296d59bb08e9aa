//! Repository traits decoupling the application layer from storage.

pub mod short_url_repository;
pub mod user_repository;

pub use short_url_repository::ShortUrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
