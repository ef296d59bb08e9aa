//! HTTP layer: sessions, CSRF protection, auth guards, forms and handlers.

pub mod auth;
pub mod csrf;
pub mod forms;
pub mod handlers;
pub mod rate_limit;
pub mod session;
pub mod signing;
