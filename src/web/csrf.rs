//! CSRF token issuance and request protection.
//!
//! A per-session random seed lives in the signed session cookie. Tokens put
//! into forms are the seed run through a timestamped signer keyed off
//! `SECRET_KEY` with its own salt, so a token proves both "issued by us" and
//! "issued for this session", and goes stale after [`CSRF_MAX_AGE`].
//!
//! The [`protect`] middleware validates every unsafe-method request before it
//! reaches a handler, which covers one-button forms that have no dedicated
//! form struct.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::urls::same_origin_referrer;
use crate::web::session::Session;
use crate::web::signing;

/// Form field carrying the CSRF token.
pub const CSRF_FIELD_NAME: &str = "csrf_token";

/// Token lifetime in seconds.
pub const CSRF_MAX_AGE: u64 = 3600;

const CSRF_SALT: &str = "csrf-token";

/// Largest form body the protection middleware will buffer.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Reasons a CSRF check can fail, with user-facing messages.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CsrfRejection {
    #[error("The CSRF token is missing.")]
    MissingToken,
    #[error("The CSRF session token is missing.")]
    MissingSessionToken,
    #[error("The CSRF token has expired.")]
    Expired,
    #[error("The CSRF token is invalid.")]
    Invalid,
    #[error("The CSRF tokens do not match.")]
    Mismatch,
    #[error("The referrer header is missing.")]
    MissingReferrer,
    #[error("The referrer does not match the host.")]
    ReferrerMismatch,
}

impl From<CsrfRejection> for AppError {
    fn from(rejection: CsrfRejection) -> Self {
        AppError::Csrf(rejection.to_string())
    }
}

/// Signs and verifies per-session CSRF tokens.
#[derive(Clone)]
pub struct CsrfSigner {
    key: Arc<[u8; 32]>,
}

impl CsrfSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: Arc::new(signing::derive_key(secret, CSRF_SALT)),
        }
    }

    /// Issues a token for the session, creating the session seed on first use.
    pub fn issue(&self, session: &Session) -> String {
        let seed = session.ensure_csrf_seed();
        self.sign_at(&seed, unix_now())
    }

    fn sign_at(&self, seed: &str, timestamp: u64) -> String {
        let payload = format!(
            "{}.{}",
            signing::b64_encode(seed.as_bytes()),
            signing::b64_encode(timestamp.to_string().as_bytes())
        );
        let signature = signing::sign(self.key.as_ref(), payload.as_bytes());
        format!("{payload}.{signature}")
    }

    /// Validates a submitted token against the session seed.
    pub fn verify(&self, token: Option<&str>, session: &Session) -> Result<(), CsrfRejection> {
        self.verify_at(token, session, unix_now())
    }

    fn verify_at(
        &self,
        token: Option<&str>,
        session: &Session,
        now: u64,
    ) -> Result<(), CsrfRejection> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(CsrfRejection::MissingToken),
        };

        let Some(session_seed) = session.csrf_seed() else {
            return Err(CsrfRejection::MissingSessionToken);
        };

        let (payload, signature) = token.rsplit_once('.').ok_or(CsrfRejection::Invalid)?;
        if !signing::verify(self.key.as_ref(), payload.as_bytes(), signature) {
            return Err(CsrfRejection::Invalid);
        }

        let (seed_part, timestamp_part) =
            payload.split_once('.').ok_or(CsrfRejection::Invalid)?;

        let timestamp: u64 = signing::b64_decode(timestamp_part)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|s| s.parse().ok())
            .ok_or(CsrfRejection::Invalid)?;
        if now.saturating_sub(timestamp) > CSRF_MAX_AGE {
            return Err(CsrfRejection::Expired);
        }

        let seed = signing::b64_decode(seed_part)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(CsrfRejection::Invalid)?;
        if !signing::constant_time_eq(&seed, &session_seed) {
            return Err(CsrfRejection::Mismatch);
        }

        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}

fn is_unsafe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Whether the client request reached us over HTTPS.
///
/// TLS usually terminates at a reverse proxy, so this trusts
/// `X-Forwarded-Proto` only when the service is configured as proxied.
fn is_secure(headers: &HeaderMap, behind_proxy: bool) -> bool {
    behind_proxy
        && headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn form_field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// CSRF protection middleware for unsafe request methods.
///
/// Buffers the form body to read the token field, then re-attaches the bytes
/// so handlers can parse the form as usual. Safe methods pass through
/// untouched.
pub async fn protect(
    State(st): State<AppState>,
    session: axum::Extension<Session>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_unsafe_method(req.method()) {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::Validation("Request body too large.".to_string()))?;

    let token = form_field(&bytes, CSRF_FIELD_NAME);
    st.csrf.verify(token.as_deref(), &session)?;

    if is_secure(&parts.headers, st.behind_proxy) {
        let referrer = parts
            .headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .ok_or(CsrfRejection::MissingReferrer)?;
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .ok_or(CsrfRejection::ReferrerMismatch)?;

        if !same_origin_referrer(referrer, host) {
            return Err(CsrfRejection::ReferrerMismatch.into());
        }
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}
