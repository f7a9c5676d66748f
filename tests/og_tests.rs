mod common;

use std::time::{Duration, Instant};

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use linkshelf_server::resolver::{OgResolver, ResolveError};

const FULL_PAGE: &str = r#"<!doctype html><html><head>
    <title>Fallback</title>
    <meta property="og:title" content="Mock Article"/>
    <meta property="og:description" content="An article about mocks"/>
    <meta property="og:image" content="/cover.png"/>
    <link rel="icon" href="/favicon.ico"/>
</head><body></body></html>"#;

const BARE_PAGE: &str = r#"<html><head><title>Only a title</title></head></html>"#;

fn html(body: &'static str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body)
}

async fn mock_site() -> String {
    let router = Router::new()
        .route("/full", get(|| async { html(FULL_PAGE) }))
        .route("/bare", get(|| async { html(BARE_PAGE) }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        )
        .route(
            "/json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{}") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                html(FULL_PAGE)
            }),
        );
    common::spawn_upstream(router).await
}

#[tokio::test]
async fn og_requires_url_parameter() {
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let (status, body) = common::get_no_auth(app, "/api/og").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing url parameter");
}

#[tokio::test]
async fn og_rejects_blank_url_parameter() {
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let (status, body) = common::get_no_auth(app, "/api/og?url=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing url parameter");
}

#[tokio::test]
async fn og_returns_normalized_metadata() {
    let site = mock_site().await;
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/full")));

    let (status, body) = common::get_no_auth(app, &uri).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["title"], "Mock Article");
    assert_eq!(body["description"], "An article about mocks");
    assert_eq!(body["image"], format!("{site}/cover.png"));
    assert_eq!(body["favicon"], format!("{site}/favicon.ico"));
}

#[tokio::test]
async fn og_missing_image_is_empty_string() {
    let site = mock_site().await;
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/bare")));

    let (status, body) = common::get_no_auth(app, &uri).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["image"], "");
    assert_eq!(body["description"], "");
    assert_eq!(body["favicon"], "");
    assert_eq!(body["title"], "Only a title");
}

#[tokio::test]
async fn og_non_2xx_is_fetch_failure() {
    let site = mock_site().await;
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/missing")));

    let (status, body) = common::get_no_auth(app, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch OG data");
    assert!(body["details"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn og_non_html_is_fetch_failure() {
    let site = mock_site().await;
    let app = common::create_test_app(&common::test_config("http://127.0.0.1:9"));
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/json")));

    let (status, body) = common::get_no_auth(app, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch OG data");
}

#[tokio::test]
async fn og_blocks_private_hosts_by_default() {
    let site = mock_site().await;
    let mut config = common::test_config("http://127.0.0.1:9");
    config.allow_private_hosts = false;
    let app = common::create_test_app(&config);
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/full")));

    let (status, body) = common::get_no_auth(app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {body}");
}

#[tokio::test]
async fn og_timeout_fails_no_earlier_than_configured() {
    let site = mock_site().await;
    let timeout = Duration::from_millis(300);
    let resolver = OgResolver::new(timeout, false).unwrap();

    let started = Instant::now();
    let err = resolver.resolve(&format!("{site}/slow")).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(err, ResolveError::FetchFailed { .. }),
        "expected FetchFailed, got {err:?}"
    );
    assert!(elapsed >= timeout, "failed after {elapsed:?}, before {timeout:?}");
    assert!(elapsed < Duration::from_secs(3), "timeout not enforced: {elapsed:?}");
}

#[tokio::test]
async fn og_requires_secret_when_configured() {
    let site = mock_site().await;
    let mut config = common::test_config("http://127.0.0.1:9");
    config.access_secret = Some(common::TEST_SECRET.into());
    let uri = format!("/api/og?url={}", common::encode(&format!("{site}/full")));

    let (status, _) = common::get_no_auth(common::create_test_app(&config), &uri).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        common::get_authed(common::create_test_app(&config), &uri, "wrong-secret").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        common::get_authed(common::create_test_app(&config), &uri, common::TEST_SECRET).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["title"], "Mock Article");
}
