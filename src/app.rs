use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::state::AppState;

/// Application routes, shared by the binary and the integration tests.
/// Outer layers (CORS, metrics) are added by `main`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/og", get(handlers::og::get_og))
        .route(
            "/api/youtube-thumbnails",
            get(handlers::youtube::get_channel_thumbnails),
        )
        .route(
            "/api/video-thumbnail",
            get(handlers::youtube::get_video_thumbnail),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: `ALLOWED_ORIGINS` wins when set (`*` for any origin);
/// otherwise permissive in dev and same-origin only in production.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        tracing::info!("🔓 CORS: any origin (ALLOWED_ORIGINS=*)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid entry in ALLOWED_ORIGINS");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        tracing::info!(origins = ?config.allowed_origins, "🔒 CORS: restricted to ALLOWED_ORIGINS");
        return CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    }

    if config.is_dev {
        tracing::info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        tracing::warn!(
            "🔒 CORS: restrictive (production mode). \
             Cross-origin requests will be denied. \
             Set ALLOWED_ORIGINS to allow the front end's origin."
        );
        CorsLayer::new()
    }
}
