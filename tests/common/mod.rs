// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use linkshelf_server::{app::build_router, config::Config, state::AppState};

pub const TEST_API_KEY: &str = "test-youtube-key";
pub const TEST_SECRET: &str = "test-shared-secret";

/// Config pointing the YouTube client at `youtube_base`, with loopback
/// targets allowed so OG tests can hit local mock pages.
pub fn test_config(youtube_base: &str) -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        is_dev: true,
        youtube_api_key: Some(TEST_API_KEY.into()),
        youtube_api_base: youtube_base.into(),
        youtube_timeout: Duration::from_secs(2),
        youtube_max_pages: 50,
        og_timeout: Duration::from_millis(8000),
        allow_private_hosts: true,
        access_secret: None,
        allowed_origins: Vec::new(),
    }
}

/// Build the application router from a config.
pub fn create_test_app(config: &Config) -> Router {
    build_router(AppState::from_config(config).expect("Failed to build test state"))
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get_no_auth(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_authed(app: Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Percent-encode a value for use in a test query string.
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
