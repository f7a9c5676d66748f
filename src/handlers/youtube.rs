use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    auth::AccessGuard,
    error::AppResult,
    models::{ChannelThumbnailsDto, VideoThumbnailDto},
    resolver::{extract_video_id, ThumbnailQuality},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelThumbnailsParams {
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
}

/// GET /api/youtube-thumbnails?channelId=<id>&channelUrl=<url>
pub async fn get_channel_thumbnails(
    State(state): State<AppState>,
    _guard: AccessGuard,
    query: Result<Query<ChannelThumbnailsParams>, QueryRejection>,
) -> AppResult<Json<ChannelThumbnailsDto>> {
    let Query(params) = query?;
    let result = state
        .youtube
        .resolve_channel_thumbnails(params.channel_id.as_deref(), params.channel_url.as_deref())
        .await?;

    tracing::info!(
        channel_id = %result.channel_id,
        videos = result.thumbnails.len(),
        truncated = result.truncated,
        "Resolved channel thumbnails"
    );
    Ok(Json(result.into()))
}

#[derive(Debug, Deserialize)]
pub struct VideoThumbnailParams {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_quality")]
    pub quality: ThumbnailQuality,
}

fn default_quality() -> ThumbnailQuality {
    ThumbnailQuality::MaxRes
}

/// GET /api/video-thumbnail?url=<link>&quality=<tier>
///
/// A link that is not a YouTube video is a miss, not an error: the response
/// carries a null `videoId`. An unknown `quality` is a 400.
pub async fn get_video_thumbnail(
    _guard: AccessGuard,
    query: Result<Query<VideoThumbnailParams>, QueryRejection>,
) -> AppResult<Json<VideoThumbnailDto>> {
    let Query(params) = query?;
    Ok(Json(VideoThumbnailDto::new(
        extract_video_id(&params.url),
        params.quality,
    )))
}
