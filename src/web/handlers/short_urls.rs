//! Short URL handlers: list, create, delete and the public redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::domain::entities::ShortUrl;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::pagination::Page;
use crate::web::auth::{AuthenticatedUser, CurrentUser};
use crate::web::forms::{FormErrors, ShortUrlForm};
use crate::web::handlers::BaseContext;
use crate::web::session::Session;

const LIST_URL: &str = "/s";

/// `?page=N` with werkzeug-style leniency: anything unparseable means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "short_urls/list.html")]
pub struct ListTemplate {
    pub base: BaseContext,
    pub page: Page<ShortUrl>,
}

#[derive(Template, WebTemplate)]
#[template(path = "short_urls/create.html")]
pub struct CreateTemplate {
    pub base: BaseContext,
    pub form: ShortUrlForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "short_urls/delete.html")]
pub struct DeleteTemplate {
    pub base: BaseContext,
    pub short_url: ShortUrl,
    pub csrf_token: String,
}

/// `GET /s` (login required)
///
/// Paginated list of the current user's short URLs, newest first.
pub async fn list_handler(
    State(st): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Query(query): Query<PageQuery>,
) -> Result<ListTemplate, AppError> {
    let page = st
        .short_urls
        .page_for_owner(user.id, query.number(), st.urls_per_page)
        .await?;

    Ok(ListTemplate {
        base: BaseContext::new(&current_user, &session),
        page,
    })
}

/// `GET /s/create` (login required)
pub async fn create_page(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> CreateTemplate {
    CreateTemplate {
        base: BaseContext::new(&current_user, &session),
        form: ShortUrlForm::default(),
        errors: FormErrors::default(),
        csrf_token: st.csrf.issue(&session),
    }
}

/// `POST /s/create` (login required)
pub async fn create_submit(
    State(st): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(form): Form<ShortUrlForm>,
) -> Result<Response, AppError> {
    let errors = form.field_errors();

    if errors.is_empty() {
        st.short_urls
            .create_for_owner(user.id, form.full_url.clone())
            .await?;

        session.flash("New shortened URL created successfully.", "success");
        return Ok(Redirect::to(LIST_URL).into_response());
    }

    Ok(CreateTemplate {
        base: BaseContext::new(&current_user, &session),
        csrf_token: st.csrf.issue(&session),
        form,
        errors,
    }
    .into_response())
}

/// `GET /s/{slug}` (public)
///
/// Counts the click and redirects to the stored full URL.
pub async fn follow_handler(
    State(st): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Redirect, AppError> {
    let full_url = st.short_urls.follow(&slug).await?;
    Ok(Redirect::temporary(&full_url))
}

/// `GET /s/{slug}/delete` (login required)
///
/// Confirmation page; 404 unless the requester owns the record or is staff.
pub async fn delete_page(
    State(st): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(slug): Path<String>,
) -> Result<DeleteTemplate, AppError> {
    let short_url = st.short_urls.get_managed_by_slug(&slug, &user).await?;

    Ok(DeleteTemplate {
        base: BaseContext::new(&current_user, &session),
        csrf_token: st.csrf.issue(&session),
        short_url,
    })
}

/// `POST /s/{slug}/delete` (login required)
pub async fn delete_submit(
    State(st): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Extension(session): Extension<Session>,
    Path(slug): Path<String>,
) -> Result<Redirect, AppError> {
    st.short_urls.delete(&slug, &user).await?;

    session.flash("Your short URL was deleted successfully", "success");
    Ok(Redirect::to(LIST_URL))
}
