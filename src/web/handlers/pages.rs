//! Landing page and error page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::web::auth::CurrentUser;
use crate::web::handlers::BaseContext;
use crate::web::session::Session;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub base: BaseContext,
}

#[derive(Template, WebTemplate, Default)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub base: BaseContext,
}

#[derive(Template, WebTemplate, Default)]
#[template(path = "errors/405.html")]
pub struct MethodNotAllowedTemplate {
    pub base: BaseContext,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler(
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> IndexTemplate {
    IndexTemplate {
        base: BaseContext::new(&current_user, &session),
    }
}

/// Fallback handler rendering the 404 page for unmatched routes.
pub async fn not_found_handler(
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            base: BaseContext::new(&current_user, &session),
        },
    )
        .into_response()
}

/// Replaces axum's bare 405 response with the rendered 405 page.
///
/// The `Allow` header produced by the method router is preserved.
pub async fn render_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();

    let mut rendered = (
        StatusCode::METHOD_NOT_ALLOWED,
        MethodNotAllowedTemplate::default(),
    )
        .into_response();

    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }

    rendered
}
