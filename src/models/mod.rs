use serde::{Deserialize, Serialize};

use crate::resolver::{
    video::thumbnail_url, ChannelThumbnails, LinkMetadata, ThumbnailQuality, VideoThumbnailRef,
};

// ============================================================================
// Open Graph Models
// ============================================================================

/// Preview card shape returned by `GET /api/og`. Every field is a string;
/// missing metadata is `""`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OgPreviewDto {
    pub image: String,
    pub title: String,
    pub description: String,
    pub favicon: String,
}

impl From<LinkMetadata> for OgPreviewDto {
    fn from(meta: LinkMetadata) -> Self {
        OgPreviewDto {
            image: meta.image_url,
            title: meta.title,
            description: meta.description,
            favicon: meta.favicon_url,
        }
    }
}

// ============================================================================
// YouTube Models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailDto {
    pub video_id: String,
    pub thumbnail: String,
    pub fallback: String,
}

impl From<VideoThumbnailRef> for ThumbnailDto {
    fn from(thumb: VideoThumbnailRef) -> Self {
        ThumbnailDto {
            video_id: thumb.video_id,
            thumbnail: thumb.primary_thumbnail_url,
            fallback: thumb.fallback_thumbnail_url,
        }
    }
}

/// Response of `GET /api/youtube-thumbnails`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelThumbnailsDto {
    pub channel_id: String,
    pub thumbnails: Vec<ThumbnailDto>,
    pub truncated: bool,
}

impl From<ChannelThumbnails> for ChannelThumbnailsDto {
    fn from(result: ChannelThumbnails) -> Self {
        ChannelThumbnailsDto {
            channel_id: result.channel_id,
            thumbnails: result.thumbnails.into_iter().map(ThumbnailDto::from).collect(),
            truncated: result.truncated,
        }
    }
}

/// Response of `GET /api/video-thumbnail`.
///
/// `video_id` and the URLs are null when the link is not a YouTube video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoThumbnailDto {
    pub video_id: Option<String>,
    pub quality: ThumbnailQuality,
    pub thumbnail: Option<String>,
    pub fallback: Option<String>,
    pub next_quality: Option<ThumbnailQuality>,
}

impl VideoThumbnailDto {
    pub fn new(video_id: Option<String>, quality: ThumbnailQuality) -> Self {
        let thumbnail = video_id.as_deref().map(|id| thumbnail_url(id, quality));
        let fallback = video_id
            .as_deref()
            .map(|id| VideoThumbnailRef::new(id).fallback_thumbnail_url);
        VideoThumbnailDto {
            next_quality: crate::resolver::next_fallback_quality(quality),
            video_id,
            quality,
            thumbnail,
            fallback,
        }
    }
}
