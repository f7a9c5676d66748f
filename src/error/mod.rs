use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resolver::ResolveError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Channel resolution error: {0}")]
    ChannelResolution(String),

    #[error("Upstream error: {message}: {details}")]
    Upstream { message: String, details: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal,
}

/// Map resolver failures onto HTTP semantics: bad input and unresolvable
/// channels are the caller's problem (400), everything else is ours (500).
impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidInput(msg) => AppError::Validation(msg),
            ResolveError::ChannelResolutionFailed(msg) => AppError::ChannelResolution(msg),
            ResolveError::FetchFailed { context, details } => AppError::Upstream {
                message: context,
                details,
            },
            ResolveError::ConfigurationMissing(msg) => AppError::Configuration(msg),
        }
    }
}

/// Malformed query strings answer with the same JSON shape as any other 400.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ChannelResolution(details) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Could not resolve channelId from channelUrl",
                    "details": details,
                }),
            ),
            AppError::Upstream { message, details } => {
                tracing::warn!(%message, %details, "Upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::Internal => {
                tracing::error!("Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn auth_error_returns_401() {
        let response = AppError::Auth("unauthorized".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn validation_error_returns_400_with_error_key() {
        let response = AppError::Validation("Missing url parameter".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "Missing url parameter");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn channel_resolution_returns_400_with_details() {
        let response = AppError::ChannelResolution("no channel".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "Could not resolve channelId from channelUrl");
        assert_eq!(json["details"], "no channel");
    }

    #[tokio::test]
    async fn upstream_error_returns_500_with_details() {
        let err: AppError = ResolveError::FetchFailed {
            context: "Failed to fetch OG data".into(),
            details: "operation timed out".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "Failed to fetch OG data");
        assert_eq!(json["details"], "operation timed out");
    }

    #[tokio::test]
    async fn configuration_error_returns_500_without_details() {
        let err: AppError =
            ResolveError::ConfigurationMissing("Missing YOUTUBE_API_KEY in environment".into())
                .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "Missing YOUTUBE_API_KEY in environment");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn internal_error_returns_500() {
        let response = AppError::Internal.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
