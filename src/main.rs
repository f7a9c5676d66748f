use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkshelf_server::app::{build_router, cors_layer};
use linkshelf_server::config::Config;
use linkshelf_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linkshelf_server=info,tower_http=info"));

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Linkshelf server starting...");

    let config = Config::from_env();
    info!("📝 Configuration loaded");

    if config.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY is not set; /api/youtube-thumbnails will return 500");
    }
    if config.access_secret.is_some() {
        info!("🔒 API routes require the shared access secret");
    }

    let cors = cors_layer(&config);

    let app_state = AppState::from_config(&config).expect("Failed to build HTTP clients");

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = build_router(app_state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(cors);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
