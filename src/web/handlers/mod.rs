//! Template rendering handlers.

pub mod accounts;
pub mod pages;
pub mod short_urls;

use crate::web::auth::CurrentUser;
use crate::web::session::{Flash, Session};

/// Context consumed by the base layout: nav state and flash messages.
///
/// Building it pops the queued flashes, so construct it once per rendered
/// page.
#[derive(Debug, Default)]
pub struct BaseContext {
    pub username: Option<String>,
    pub flashes: Vec<Flash>,
}

impl BaseContext {
    pub fn new(current_user: &CurrentUser, session: &Session) -> Self {
        Self {
            username: current_user.username(),
            flashes: session.take_flashes(),
        }
    }
}
