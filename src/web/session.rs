//! Signed cookie session storage.
//!
//! The whole session payload lives in the cookie: a base64url-encoded JSON
//! document plus an HMAC-SHA256 signature over it. Nothing is stored server
//! side. A missing, malformed or tampered cookie decodes to an empty session.
//!
//! The middleware decodes the cookie once per request into a shared
//! [`Session`] handle placed in request extensions, and writes one
//! `Set-Cookie` header on the way out only when the session was mutated.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::utils::slug::generate_csrf_seed;
use crate::web::signing;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

const SESSION_SALT: &str = "session-cookie";

/// A queued flash message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub category: String,
}

/// Serialized session payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_seed: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

/// Encodes and decodes signed session cookies.
#[derive(Clone)]
pub struct SessionCodec {
    key: Arc<[u8; 32]>,
}

impl SessionCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            key: Arc::new(signing::derive_key(secret, SESSION_SALT)),
        }
    }

    /// Serializes session data into a signed cookie value.
    pub fn encode(&self, data: &SessionData) -> String {
        let json = serde_json::to_vec(data).expect("session data serializes to JSON");
        let payload = signing::b64_encode(&json);
        let signature = signing::sign(self.key.as_ref(), payload.as_bytes());
        format!("{payload}.{signature}")
    }

    /// Decodes a cookie value, returning `None` for anything not produced and
    /// signed by this codec.
    pub fn decode(&self, cookie_value: &str) -> Option<SessionData> {
        let (payload, signature) = cookie_value.rsplit_once('.')?;

        if !signing::verify(self.key.as_ref(), payload.as_bytes(), signature) {
            return None;
        }

        let json = signing::b64_decode(payload)?;
        serde_json::from_slice(&json).ok()
    }
}

struct SessionInner {
    data: SessionData,
    dirty: bool,
}

/// Request-scoped handle to the decoded session.
///
/// Cloning shares the same underlying state, so mutations made in handlers
/// are visible to the middleware that saves the cookie.
#[derive(Clone)]
pub struct Session(Arc<Mutex<SessionInner>>);

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self(Arc::new(Mutex::new(SessionInner { data, dirty: false })))
    }

    pub fn empty() -> Self {
        Self::new(SessionData::default())
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.lock().unwrap().data.user_id
    }

    /// Stores the user id, starting a logged-in session.
    pub fn login(&self, user_id: i64) {
        let mut inner = self.0.lock().unwrap();
        inner.data.user_id = Some(user_id);
        inner.dirty = true;
    }

    /// Removes the user id, ending the logged-in session.
    pub fn logout(&self) {
        let mut inner = self.0.lock().unwrap();
        if inner.data.user_id.take().is_some() {
            inner.dirty = true;
        }
    }

    /// Queues a flash message for the next rendered page.
    pub fn flash(&self, message: impl Into<String>, category: impl Into<String>) {
        let mut inner = self.0.lock().unwrap();
        inner.data.flashes.push(Flash {
            message: message.into(),
            category: category.into(),
        });
        inner.dirty = true;
    }

    /// Pops all queued flash messages.
    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut inner = self.0.lock().unwrap();
        if inner.data.flashes.is_empty() {
            return Vec::new();
        }
        inner.dirty = true;
        std::mem::take(&mut inner.data.flashes)
    }

    pub fn csrf_seed(&self) -> Option<String> {
        self.0.lock().unwrap().data.csrf_seed.clone()
    }

    /// Returns the CSRF seed, generating and storing one on first use.
    pub fn ensure_csrf_seed(&self) -> String {
        let mut inner = self.0.lock().unwrap();
        if let Some(seed) = &inner.data.csrf_seed {
            return seed.clone();
        }

        let seed = generate_csrf_seed();
        inner.data.csrf_seed = Some(seed.clone());
        inner.dirty = true;
        seed
    }

    pub fn is_dirty(&self) -> bool {
        self.0.lock().unwrap().dirty
    }

    pub fn snapshot(&self) -> SessionData {
        self.0.lock().unwrap().data.clone()
    }
}

/// Extracts a named cookie from a `Cookie` header value.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|cookie| {
        let mut parts = cookie.trim().splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) if key == name => Some(value.to_string()),
            _ => None,
        }
    })
}

/// Session middleware: decode on the way in, save on the way out.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let data = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| cookie_value(header, SESSION_COOKIE))
        .and_then(|value| st.sessions.decode(&value))
        .unwrap_or_default();

    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if session.is_dirty() {
        let value = st.sessions.encode(&session.snapshot());
        let cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(header_value) => {
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, header_value);
            }
            Err(e) => tracing::error!("Failed to serialize session cookie: {e}"),
        }
    }

    response
}
