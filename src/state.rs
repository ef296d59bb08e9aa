use std::sync::Arc;

use crate::application::services::{AuthService, ShortUrlService};
use crate::web::csrf::CsrfSigner;
use crate::web::session::SessionCodec;

/// Shared application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub short_urls: Arc<ShortUrlService>,
    pub sessions: SessionCodec,
    pub csrf: CsrfSigner,
    pub urls_per_page: i64,
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        short_urls: Arc<ShortUrlService>,
        secret_key: &str,
        urls_per_page: i64,
        behind_proxy: bool,
    ) -> Self {
        Self {
            auth_service,
            short_urls,
            sessions: SessionCodec::new(secret_key),
            csrf: CsrfSigner::new(secret_key),
            urls_per_page,
            behind_proxy,
        }
    }
}
