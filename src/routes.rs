//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`                    - Landing page (public)
//! - `GET  /s/{slug}`            - Short link redirect (public)
//! - `/accounts/*`               - Registration, login and profile
//! - `GET|POST /s/...`           - Short URL management (login required)
//! - `/static/*`                 - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket
//! - **Sessions** - Signed cookie decoded into a request extension
//! - **CSRF** - Token check on every unsafe-method request
//! - **Path normalization** - Trailing slash handling

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::handlers::{accounts, pages, short_urls};
use crate::web::{auth, csrf, rate_limit, session};

/// Routes reachable only by anonymous visitors.
fn guest_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/login",
            get(accounts::login_page).post(accounts::login_submit),
        )
        .route(
            "/accounts/register",
            get(accounts::register_page).post(accounts::register_submit),
        )
}

/// Routes requiring an authenticated session.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/profile", get(accounts::profile_handler))
        .route("/accounts/logout", get(accounts::logout_handler))
        .route(
            "/accounts/deactivate",
            get(accounts::deactivate_page).post(accounts::deactivate_submit),
        )
        .route("/s", get(short_urls::list_handler))
        .route(
            "/s/create",
            get(short_urls::create_page).post(short_urls::create_submit),
        )
        .route(
            "/s/{slug}/delete",
            get(short_urls::delete_page).post(short_urls::delete_submit),
        )
}

/// Constructs the web router without the outer transport layers.
///
/// Sessions, login state, CSRF protection and the custom 404/405 pages are
/// all wired here; tracing, rate limiting and static files are added by
/// [`app_router`].
pub fn web_router(state: AppState) -> Router {
    build_router(state, false)
}

/// Like [`web_router`], but with the stricter per-IP limiter wrapped
/// around the credential endpoints.
///
/// Kept separate because the limiter keys on the peer address and so
/// needs a transport that supplies `ConnectInfo`.
pub fn rate_limited_router(state: AppState) -> Router {
    build_router(state, true)
}

fn build_router(state: AppState, limit_auth: bool) -> Router {
    let mut guest = guest_routes().route_layer(middleware::from_fn(auth::require_logout));
    if limit_auth {
        guest = guest.layer(rate_limit::secure_layer());
    }

    let protected = protected_routes().route_layer(middleware::from_fn(auth::require_login));

    Router::new()
        .route("/", get(pages::index_handler))
        .route("/s/{slug}", get(short_urls::follow_handler))
        .merge(guest)
        .merge(protected)
        .fallback(pages::not_found_handler)
        .layer(middleware::map_response(pages::render_method_not_allowed))
        .layer(middleware::from_fn_with_state(state.clone(), csrf::protect))
        .layer(middleware::from_fn_with_state(state.clone(), auth::load_user))
        .layer(middleware::from_fn_with_state(state.clone(), session::layer))
        .with_state(state)
}

/// Constructs the full application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = rate_limited_router(state)
        .nest_service("/static", ServeDir::new("static"))
        .layer(rate_limit::layer())
        .layer(TraceLayer::new_for_http());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
