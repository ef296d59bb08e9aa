//! Application layer: services between HTTP handlers and repositories.

pub mod services;
