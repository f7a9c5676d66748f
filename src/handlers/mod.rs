pub mod og;
pub mod youtube;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let youtube_ok = state.youtube.is_configured();
    if !youtube_ok {
        tracing::debug!("Health check: YOUTUBE_API_KEY not configured");
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": if youtube_ok { "ok" } else { "degraded" },
            "service": "linkshelf-server",
            "version": env!("CARGO_PKG_VERSION"),
            "youtube": if youtube_ok { "configured" } else { "missing api key" },
        })),
    )
}
