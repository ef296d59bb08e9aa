use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::web::handlers::pages::NotFoundTemplate;

/// Application error rendered as an HTML response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid user input that was not caught by form validation.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// The requested record or page does not exist.
    #[error("not found")]
    NotFound,

    /// CSRF validation rejected the request.
    #[error("{0}")]
    Csrf(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, NotFoundTemplate::default()).into_response()
            }
            AppError::Validation(message) | AppError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Html(error_page(&message))).into_response()
            }
            AppError::Csrf(reason) => {
                tracing::warn!("CSRF validation failed: {reason}");
                (StatusCode::BAD_REQUEST, Html(error_page(&reason))).into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(error_page("Internal Server Error")),
                )
                    .into_response()
            }
            AppError::Internal(message) => {
                tracing::error!("Internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(error_page("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}

fn error_page(message: &str) -> String {
    let escaped = html_escape(message);
    format!("<!DOCTYPE html>\n<html><body><h1>{escaped}</h1></body></html>\n")
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns true when `e` is a unique violation on the named constraint.
pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
