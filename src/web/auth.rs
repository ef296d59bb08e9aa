//! Login state: current-user loading and route guards.
//!
//! The session stores only the user id. [`load_user`] resolves it to a full
//! [`User`] once per request and stashes the result in request extensions, so
//! handlers and guards share a single lookup.

use axum::{
    Extension,
    extract::{FromRequestParts, Request, State},
    http::{Uri, request::Parts},
    middleware::Next,
    response::{Redirect, Response},
};

use crate::error::AppError;

use crate::domain::entities::User;
use crate::state::AppState;
use crate::web::session::Session;

/// The user behind the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|u| u.username.clone())
    }
}

/// Extractor for handlers sitting behind [`require_login`].
///
/// The guard guarantees an authenticated user; this unwraps the
/// [`CurrentUser`] extension into the [`User`] itself.
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .and_then(|current_user| current_user.0.clone())
            .map(AuthenticatedUser)
            .ok_or_else(|| {
                AppError::Internal("authenticated user missing from request".to_string())
            })
    }
}

/// Resolves the session user id into a [`CurrentUser`] extension.
///
/// A stale id (deleted account) degrades to an anonymous request rather than
/// an error.
pub async fn load_user(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match session.user_id() {
        Some(user_id) => st.auth_service.load_user(user_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to load user {user_id}: {e}");
            None
        }),
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

/// Guard for login-required routes.
///
/// Anonymous requests are flashed and redirected to the login page with a
/// `next` parameter pointing back at the original path and query.
pub async fn require_login(
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    if current_user.is_authenticated() {
        return Ok(next.run(req).await);
    }

    session.flash("Login required.", "danger");
    Err(Redirect::to(&login_url_with_next(req.uri())))
}

/// Guard for guest-only routes (login, register).
///
/// Authenticated users have nothing to do there and get bounced to their
/// profile.
pub async fn require_logout(
    Extension(current_user): Extension<CurrentUser>,
    req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    if current_user.is_authenticated() {
        return Err(Redirect::to("/accounts/profile"));
    }

    Ok(next.run(req).await)
}

/// Builds the login URL carrying the original location as `?next=`.
pub fn login_url_with_next(uri: &Uri) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", &make_next_param(uri))
        .finish();
    format!("/accounts/login?{query}")
}

/// Reduces a request URI to the relative form used for the `next` parameter.
pub fn make_next_param(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    }
}

/// Accepts a `next` target only when it is a same-site relative path.
///
/// The parameter can be tampered with, so anything absolute or
/// protocol-relative is discarded to prevent open redirects.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?;

    if !next.starts_with('/') {
        return None;
    }
    if next.starts_with("//") || next.starts_with("/\\") {
        return None;
    }

    Some(next.to_string())
}
