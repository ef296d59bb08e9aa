mod common;

use common::{create_short_url, extract_csrf_token, login_user, spawn_app};

#[tokio::test]
async fn test_create_short_url() {
    let app = spawn_app();
    app.users.insert_user("alice", "sup3rsecret", false);
    login_user(&app, "alice", "sup3rsecret").await;

    let slug = create_short_url(&app, "https://example.com/some/long/path").await;
    assert_eq!(slug.len(), 4);
    assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));

    let list = app.server.get("/s").await;
    assert_eq!(list.status_code(), 200);
    let body = list.text();
    assert!(body.contains("New shortened URL created successfully."));
    assert!(body.contains(&slug));
    assert!(body.contains("https://example.com/some/long/path"));
}

#[tokio::test]
async fn test_create_rejects_invalid_url() {
    let app = spawn_app();
    app.users.insert_user("alice", "sup3rsecret", false);
    login_user(&app, "alice", "sup3rsecret").await;

    let page = app.server.get("/s/create").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/s/create")
        .form(&[
            ("csrf_token", token.as_str()),
            ("full_url", "not a url at all"),
        ])
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Invalid URL."));
    assert_eq!(app.short_urls.len(), 0);
}

#[tokio::test]
async fn test_create_rejects_non_http_scheme() {
    let app = spawn_app();
    app.users.insert_user("alice", "sup3rsecret", false);
    login_user(&app, "alice", "sup3rsecret").await;

    let page = app.server.get("/s/create").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/s/create")
        .form(&[
            ("csrf_token", token.as_str()),
            ("full_url", "ftp://example.com/file"),
        ])
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Only http/https URLs are allowed."));
}

#[tokio::test]
async fn test_create_rejects_empty_url() {
    let app = spawn_app();
    app.users.insert_user("alice", "sup3rsecret", false);
    login_user(&app, "alice", "sup3rsecret").await;

    let page = app.server.get("/s/create").await;
    let token = extract_csrf_token(&page.text());

    let response = app
        .server
        .post("/s/create")
        .form(&[("csrf_token", token.as_str()), ("full_url", "")])
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Full URL field is required."));
}

#[tokio::test]
async fn test_list_shows_only_own_urls() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    let bob = app.users.insert_user("bob", "sup3rsecret", false);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/alice", "aaaa");
    app.short_urls
        .insert_short_url(bob.id, "https://example.com/bob", "bbbb");

    login_user(&app, "alice", "sup3rsecret").await;

    let body = app.server.get("/s").await.text();
    assert!(body.contains("https://example.com/alice"));
    assert!(!body.contains("https://example.com/bob"));
}

#[tokio::test]
async fn test_list_pagination() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    for i in 0..6 {
        app.short_urls.insert_short_url(
            alice.id,
            &format!("https://example.com/page/{i}"),
            &format!("aa0{i}"),
        );
    }

    login_user(&app, "alice", "sup3rsecret").await;

    // Newest first; first page holds five entries.
    let first = app.server.get("/s").await.text();
    assert!(first.contains("https://example.com/page/5"));
    assert!(first.contains("https://example.com/page/1"));
    assert!(!first.contains("https://example.com/page/0\""));
    assert!(first.contains("Page 1 of 2"));
    assert!(first.contains("page=2"));

    let second = app.server.get("/s").add_query_param("page", "2").await;
    assert_eq!(second.status_code(), 200);
    let body = second.text();
    assert!(body.contains("https://example.com/page/0"));
    assert!(body.contains("Page 2 of 2"));
}

#[tokio::test]
async fn test_list_out_of_range_pages_are_not_found() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/only", "aaaa");

    login_user(&app, "alice", "sup3rsecret").await;

    for page in ["0", "-1", "2"] {
        let response = app.server.get("/s").add_query_param("page", page).await;
        assert_eq!(response.status_code(), 404, "page={page}");
    }
}

#[tokio::test]
async fn test_list_unparseable_page_falls_back_to_first() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/only", "aaaa");

    login_user(&app, "alice", "sup3rsecret").await;

    let response = app.server.get("/s").add_query_param("page", "abc").await;
    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("https://example.com/only"));
}

#[tokio::test]
async fn test_empty_list_renders_empty_state() {
    let app = spawn_app();
    app.users.insert_user("alice", "sup3rsecret", false);
    login_user(&app, "alice", "sup3rsecret").await;

    let response = app.server.get("/s").await;
    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("You have no short URLs yet."));
}

#[tokio::test]
async fn test_owner_can_delete_own_url() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/gone", "aaaa");

    login_user(&app, "alice", "sup3rsecret").await;

    let confirm = app.server.get("/s/aaaa/delete").await;
    assert_eq!(confirm.status_code(), 200);
    assert!(confirm.text().contains("https://example.com/gone"));
    let token = extract_csrf_token(&confirm.text());

    let response = app
        .server
        .post("/s/aaaa/delete")
        .form(&[("csrf_token", token.as_str())])
        .await;
    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header("location"), "/s");

    assert!(app.short_urls.get_by_slug("aaaa").is_none());

    let list = app.server.get("/s").await;
    assert!(
        list.text()
            .contains("Your short URL was deleted successfully")
    );
}

#[tokio::test]
async fn test_delete_of_foreign_url_is_not_found() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    app.users.insert_user("bob", "sup3rsecret", false);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/alice", "aaaa");

    login_user(&app, "bob", "sup3rsecret").await;

    let response = app.server.get("/s/aaaa/delete").await;
    assert_eq!(response.status_code(), 404);
    assert!(app.short_urls.get_by_slug("aaaa").is_some());
}

#[tokio::test]
async fn test_staff_can_delete_any_url() {
    let app = spawn_app();
    let alice = app.users.insert_user("alice", "sup3rsecret", false);
    app.users.insert_user("admin", "sup3rsecret", true);
    app.short_urls
        .insert_short_url(alice.id, "https://example.com/alice", "aaaa");

    login_user(&app, "admin", "sup3rsecret").await;

    let confirm = app.server.get("/s/aaaa/delete").await;
    assert_eq!(confirm.status_code(), 200);
    let token = extract_csrf_token(&confirm.text());

    let response = app
        .server
        .post("/s/aaaa/delete")
        .form(&[("csrf_token", token.as_str())])
        .await;
    assert_eq!(response.status_code(), 303);
    assert!(app.short_urls.get_by_slug("aaaa").is_none());
}

#[tokio::test]
async fn test_management_pages_require_login() {
    let app = spawn_app();

    for path in ["/s", "/s/create", "/s/aaaa/delete"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), 303, "{path} should redirect");
        let location = response.header("location");
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with("/accounts/login?next="),
            "{path} should point at the login page"
        );
    }
}
