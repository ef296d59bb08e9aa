#![allow(dead_code)]

//! Shared test harness: in-memory repositories and a cookie-keeping server.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use std::sync::Arc;
use std::sync::Mutex;

use snip::application::services::{AuthService, ShortUrlService};
use snip::domain::entities::{NewShortUrl, NewUser, ShortUrl, User};
use snip::domain::repositories::{ShortUrlRepository, UserRepository};
use snip::error::AppError;
use snip::routes::web_router;
use snip::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-key";
pub const URLS_PER_PAGE: i64 = 5;

#[derive(Default)]
struct UserStore {
    next_id: i64,
    rows: Vec<User>,
}

/// In-memory stand-in for the PostgreSQL user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: Mutex<UserStore>,
}

impl InMemoryUserRepository {
    /// Inserts an account directly, bypassing the registration flow.
    pub fn insert_user(&self, username: &str, password: &str, is_staff: bool) -> User {
        let password_hash = AuthService::hash_password(password).unwrap();

        let mut store = self.store.lock().unwrap();
        store.next_id += 1;

        let user = User {
            id: store.next_id,
            username: username.to_string(),
            password_hash: Some(password_hash),
            is_active: true,
            is_staff,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.rows.push(user.clone());
        user
    }

    pub fn get(&self, id: i64) -> Option<User> {
        let store = self.store.lock().unwrap();
        store.rows.iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut store = self.store.lock().unwrap();

        if store.rows.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::Conflict(
                "A user with this name already exists.".to_string(),
            ));
        }

        store.next_id += 1;
        let user = User {
            id: store.next_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .rows
            .iter()
            .find(|u| u.username == username && u.is_active)
            .cloned())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        match store.rows.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = active;
                user.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_staff(&self, id: i64, staff: bool) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        match store.rows.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_staff = staff;
                user.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.rows.clone())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.rows.len() as i64)
    }
}

#[derive(Default)]
struct ShortUrlStore {
    next_id: i64,
    rows: Vec<ShortUrl>,
}

/// In-memory stand-in for the PostgreSQL short URL repository.
#[derive(Default)]
pub struct InMemoryShortUrlRepository {
    store: Mutex<ShortUrlStore>,
}

impl InMemoryShortUrlRepository {
    /// Inserts a record directly with a fixed slug.
    pub fn insert_short_url(&self, owner_id: i64, full_url: &str, slug: &str) -> ShortUrl {
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;

        let short_url = ShortUrl {
            id: store.next_id,
            owner_id,
            full_url: full_url.to_string(),
            clicks: 0,
            slug: slug.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        store.rows.push(short_url.clone());
        short_url
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<ShortUrl> {
        let store = self.store.lock().unwrap();
        store.rows.iter().find(|s| s.slug == slug).cloned()
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut store = self.store.lock().unwrap();

        if store.rows.iter().any(|s| s.slug == new_short_url.slug) {
            return Err(AppError::Conflict("Slug already exists.".to_string()));
        }

        store.next_id += 1;
        let short_url = ShortUrl {
            id: store.next_id,
            owner_id: new_short_url.owner_id,
            full_url: new_short_url.full_url,
            clicks: 0,
            slug: new_short_url.slug,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.rows.push(short_url.clone());
        Ok(short_url)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.get_by_slug(slug))
    }

    async fn record_click(&self, slug: &str) -> Result<Option<String>, AppError> {
        let mut store = self.store.lock().unwrap();
        match store.rows.iter_mut().find(|s| s.slug == slug) {
            Some(short_url) => {
                short_url.clicks += 1;
                Ok(Some(short_url.full_url.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortUrl>, AppError> {
        let store = self.store.lock().unwrap();

        let mut rows: Vec<ShortUrl> = store
            .rows
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        // Newest first, as the SQL repository orders by created_at.
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.rows.iter().filter(|s| s.owner_id == owner_id).count() as i64)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.rows.len();
        store.rows.retain(|s| s.id != id);
        Ok(store.rows.len() < before)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.rows.iter().map(|s| s.clicks).sum())
    }
}

/// A running test application with handles into its storage.
pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<InMemoryUserRepository>,
    pub short_urls: Arc<InMemoryShortUrlRepository>,
}

/// Builds an [`AppState`] over fresh in-memory storage.
pub fn test_state(
    behind_proxy: bool,
) -> (
    AppState,
    Arc<InMemoryUserRepository>,
    Arc<InMemoryShortUrlRepository>,
) {
    let users = Arc::new(InMemoryUserRepository::default());
    let short_urls = Arc::new(InMemoryShortUrlRepository::default());

    let auth_service = Arc::new(AuthService::new(users.clone()));
    let short_url_service = Arc::new(ShortUrlService::new(short_urls.clone()));

    let state = AppState::new(
        auth_service,
        short_url_service,
        TEST_SECRET,
        URLS_PER_PAGE,
        behind_proxy,
    );

    (state, users, short_urls)
}

/// Builds the full web router over in-memory storage.
///
/// The returned server keeps cookies between requests, so session flows
/// (login, flashes, CSRF seeds) behave like a browser.
pub fn spawn_app() -> TestApp {
    spawn_with(false)
}

/// Like [`spawn_app`], but configured as if running behind a TLS-terminating
/// reverse proxy, so the referrer check applies to forwarded HTTPS requests.
pub fn spawn_proxied_app() -> TestApp {
    spawn_with(true)
}

fn spawn_with(behind_proxy: bool) -> TestApp {
    let (state, users, short_urls) = test_state(behind_proxy);

    let mut server = TestServer::new(web_router(state)).unwrap();
    server.save_cookies();

    TestApp {
        server,
        users,
        short_urls,
    }
}

/// Pulls the hidden CSRF token out of a rendered form.
pub fn extract_csrf_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html
        .find(marker)
        .expect("page should contain a csrf_token field")
        + marker.len();
    let end = html[start..]
        .find('"')
        .expect("csrf_token value should be terminated")
        + start;
    html[start..end].to_string()
}

/// Registers an account through the web flow and leaves the session logged in.
pub async fn register_user(app: &TestApp, username: &str, password: &str) {
    let page = app.server.get("/accounts/register").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/accounts/register")
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", username),
            ("password", password),
            ("password_confirm", password),
        ])
        .await;

    assert_eq!(response.status_code(), 303, "registration should redirect");
}

/// Logs in through the web flow.
pub async fn login_user(app: &TestApp, username: &str, password: &str) {
    let page = app.server.get("/accounts/login").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/accounts/login")
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", username),
            ("password", password),
        ])
        .await;

    assert_eq!(response.status_code(), 303, "login should redirect");
}

/// Logs out the current session.
pub async fn logout_user(app: &TestApp) {
    let response = app.server.get("/accounts/logout").await;
    assert_eq!(response.status_code(), 303);
}

/// Creates a short URL through the web flow and returns its slug.
pub async fn create_short_url(app: &TestApp, full_url: &str) -> String {
    let before: Vec<String> = {
        let store = app.short_urls.store.lock().unwrap();
        store.rows.iter().map(|s| s.slug.clone()).collect()
    };

    let page = app.server.get("/s/create").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/s/create")
        .form(&[("csrf_token", token.as_str()), ("full_url", full_url)])
        .await;
    assert_eq!(response.status_code(), 303, "creation should redirect");

    let store = app.short_urls.store.lock().unwrap();
    store
        .rows
        .iter()
        .map(|s| s.slug.clone())
        .find(|slug| !before.contains(slug))
        .expect("a new short URL should exist")
}
