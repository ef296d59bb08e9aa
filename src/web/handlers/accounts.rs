//! Account handlers: registration, login, logout, profile, deactivation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::web::auth::{AuthenticatedUser, CurrentUser, safe_next};
use crate::web::forms::{DeactivateForm, FORM_FIELD, FormErrors, LoginForm, RegisterForm};
use crate::web::handlers::BaseContext;
use crate::web::session::Session;

const PROFILE_URL: &str = "/accounts/profile";

/// Query string carried through the login form round-trip.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "accounts/login.html")]
pub struct LoginTemplate {
    pub base: BaseContext,
    pub form: LoginForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "accounts/register.html")]
pub struct RegisterTemplate {
    pub base: BaseContext,
    pub form: RegisterForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "accounts/profile.html")]
pub struct ProfileTemplate {
    pub base: BaseContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "accounts/deactivate.html")]
pub struct DeactivateTemplate {
    pub base: BaseContext,
    pub errors: FormErrors,
    pub csrf_token: String,
}

/// `GET /accounts/login` (guest only)
pub async fn login_page(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> LoginTemplate {
    LoginTemplate {
        base: BaseContext::new(&current_user, &session),
        form: LoginForm::default(),
        errors: FormErrors::default(),
        csrf_token: st.csrf.issue(&session),
    }
}

/// `POST /accounts/login` (guest only)
///
/// On success stores the user id in the session and redirects to the safe
/// `?next` target, falling back to the profile page.
pub async fn login_submit(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut errors = form.field_errors();

    if errors.is_empty() {
        match st
            .auth_service
            .verify_credentials(&form.username, &form.password)
            .await?
        {
            Some(user) => {
                session.login(user.id);
                session.flash("You have successfully logged into your account.", "success");

                let target =
                    safe_next(query.next.as_deref()).unwrap_or_else(|| PROFILE_URL.to_string());
                return Ok(Redirect::to(&target).into_response());
            }
            None => errors.add(FORM_FIELD, "Invalid username or password."),
        }
    }

    Ok(LoginTemplate {
        base: BaseContext::new(&current_user, &session),
        csrf_token: st.csrf.issue(&session),
        form,
        errors,
    }
    .into_response())
}

/// `GET /accounts/register` (guest only)
pub async fn register_page(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> RegisterTemplate {
    RegisterTemplate {
        base: BaseContext::new(&current_user, &session),
        form: RegisterForm::default(),
        errors: FormErrors::default(),
        csrf_token: st.csrf.issue(&session),
    }
}

/// `POST /accounts/register` (guest only)
///
/// Creates the account, immediately logs it in and redirects to the profile.
pub async fn register_submit(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let mut errors = form.field_errors();

    if errors.is_empty() && st.auth_service.is_username_taken(&form.username).await? {
        errors.add("username", "A user with this name already exists.");
    }

    if errors.is_empty() {
        match st.auth_service.register(&form.username, &form.password).await {
            Ok(user) => {
                session.login(user.id);
                session.flash("You have successfully registered your account.", "success");
                return Ok(Redirect::to(PROFILE_URL).into_response());
            }
            // Lost the race against a concurrent registration.
            Err(AppError::Conflict(message)) => errors.add("username", message),
            Err(e) => return Err(e),
        }
    }

    Ok(RegisterTemplate {
        base: BaseContext::new(&current_user, &session),
        csrf_token: st.csrf.issue(&session),
        form,
        errors,
    }
    .into_response())
}

/// `GET /accounts/profile` (login required)
pub async fn profile_handler(
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> ProfileTemplate {
    ProfileTemplate {
        base: BaseContext::new(&current_user, &session),
    }
}

/// `GET /accounts/logout` (login required)
pub async fn logout_handler(Extension(session): Extension<Session>) -> Redirect {
    session.logout();
    session.flash("You have successfully logged out from your account.", "success");
    Redirect::to("/")
}

/// `GET /accounts/deactivate` (login required)
pub async fn deactivate_page(
    State(st): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> DeactivateTemplate {
    DeactivateTemplate {
        base: BaseContext::new(&current_user, &session),
        errors: FormErrors::default(),
        csrf_token: st.csrf.issue(&session),
    }
}

/// `POST /accounts/deactivate` (login required)
///
/// Requires the current password, then disables the account and ends the
/// session.
pub async fn deactivate_submit(
    State(st): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Extension(current_user): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(form): Form<DeactivateForm>,
) -> Result<Response, AppError> {
    let mut errors = form.field_errors();

    if errors.is_empty()
        && !crate::application::services::AuthService::verify_password(&user, &form.password)
    {
        errors.add("password", "Invalid password.");
    }

    if errors.is_empty() {
        st.auth_service.deactivate(user.id).await?;
        session.logout();
        session.flash("Your account has been deactivated.", "danger");
        return Ok(Redirect::to("/").into_response());
    }

    Ok(DeactivateTemplate {
        base: BaseContext::new(&current_user, &session),
        csrf_token: st.csrf.issue(&session),
        errors,
    }
    .into_response())
}
