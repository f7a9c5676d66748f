//! Link metadata resolution: Open Graph previews, YouTube channel
//! enumeration and video thumbnail derivation.
//!
//! Every operation here is stateless. Resolvers own a `reqwest::Client`
//! (cheap to clone) and nothing else.

pub mod og;
pub mod video;
pub mod youtube;

use serde::Serialize;
use thiserror::Error;

pub use og::OgResolver;
pub use video::{extract_video_id, next_fallback_quality, ThumbnailQuality, VideoThumbnailRef};
pub use youtube::{ChannelRequest, ChannelThumbnails, YouTubeClient};

#[derive(Error, Debug)]
pub enum ResolveError {
    /// A required parameter is missing or malformed. No network call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Channel resolution failed: {0}")]
    ChannelResolutionFailed(String),

    /// An upstream request failed: transport error, timeout, non-2xx or
    /// undecodable content.
    #[error("{context}: {details}")]
    FetchFailed { context: String, details: String },

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl ResolveError {
    pub(crate) fn fetch_failed(context: &str, details: impl ToString) -> Self {
        ResolveError::FetchFailed {
            context: context.to_string(),
            details: details.to_string(),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Normalized page metadata for a link-preview card.
///
/// Absent fields are empty strings, never missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkMetadata {
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub favicon_url: String,
}
