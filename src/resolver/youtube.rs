use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::video::VideoThumbnailRef;
use super::{ResolveError, ResolveResult};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const API_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

const VIDEOS_CONTEXT: &str = "Failed to fetch videos";

static CHANNEL_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/channel/([\w-]+)").expect("valid regex"));

// ── Request ────────────────────────────────────────────────────────────────

/// How the caller identified the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRequest {
    Id(String),
    Url(String),
}

impl ChannelRequest {
    /// Build a request from the two optional query values. Blank values
    /// count as absent and an explicit id wins over a URL.
    pub fn from_parts(channel_id: Option<&str>, channel_url: Option<&str>) -> ResolveResult<Self> {
        fn non_blank(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        match (non_blank(channel_id), non_blank(channel_url)) {
            (Some(id), _) => Ok(ChannelRequest::Id(id.to_string())),
            (None, Some(url)) => Ok(ChannelRequest::Url(url.to_string())),
            (None, None) => Err(ResolveError::InvalidInput(
                "Missing channelId or valid channelUrl".into(),
            )),
        }
    }
}

/// Pull `<ID>` out of a `.../channel/<ID>` URL.
pub fn channel_id_from_url(channel_url: &str) -> Option<String> {
    CHANNEL_PATH_RE
        .captures(channel_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Final non-empty path segment of a channel URL, with any query string or
/// fragment removed. This is the legacy username or `@handle`.
pub fn channel_url_tail(channel_url: &str) -> Option<&str> {
    let path = channel_url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path.rsplit('/').find(|segment| !segment.is_empty())
}

// ── API payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

// ── Result ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelThumbnails {
    pub channel_id: String,
    pub thumbnails: Vec<VideoThumbnailRef>,
    /// Set when enumeration stopped at the page cap with more pages left.
    pub truncated: bool,
}

// ── Client ─────────────────────────────────────────────────────────────────

/// Thin client over the YouTube Data API v3 (`channels.list`, `search.list`).
#[derive(Clone, Debug)]
pub struct YouTubeClient {
    http: ReqwestClient,
    api_key: Option<String>,
    api_base: String,
    max_pages: usize,
}

impl YouTubeClient {
    pub fn new(
        api_key: Option<String>,
        api_base: impl Into<String>,
        timeout: Duration,
        max_pages: usize,
    ) -> ResolveResult<Self> {
        let http = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::fetch_failed("Failed to build HTTP client", e))?;

        Ok(YouTubeClient {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            max_pages: max_pages.max(1),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> ResolveResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("{API_KEY_VAR} is not configured");
            ResolveError::ConfigurationMissing(format!("Missing {API_KEY_VAR} in environment"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, String> {
        let url = format!("{}/{endpoint}", self.api_base);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, endpoint, "Failed to contact YouTube API");
                e.to_string()
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(endpoint, %status, "YouTube API returned error status");
            return Err(format!("YouTube API returned status {status}"));
        }

        resp.json::<T>().await.map_err(|e| {
            tracing::warn!(error = ?e, endpoint, "Failed to parse YouTube API response");
            e.to_string()
        })
    }

    /// Resolve a request to exactly one channel id.
    ///
    /// `/channel/<ID>` URLs never touch the network; other URLs are looked up
    /// by their last path segment (`forHandle` for `@handle`, `forUsername`
    /// otherwise).
    pub async fn resolve_channel_id(&self, request: &ChannelRequest) -> ResolveResult<String> {
        let channel_url = match request {
            ChannelRequest::Id(id) => return Ok(id.clone()),
            ChannelRequest::Url(url) => url,
        };

        if let Some(id) = channel_id_from_url(channel_url) {
            return Ok(id);
        }

        let tail = channel_url_tail(channel_url).ok_or_else(|| {
            ResolveError::ChannelResolutionFailed("Could not resolve channelId from channelUrl".into())
        })?;
        let param = if tail.len() > 1 && tail.starts_with('@') {
            "forHandle"
        } else {
            "forUsername"
        };

        let key = self.api_key()?;
        let listing: ChannelListResponse = self
            .get_json("channels", &[("part", "id"), (param, tail), ("key", key)])
            .await
            .map_err(ResolveError::ChannelResolutionFailed)?;

        let id = listing.items.into_iter().next().map(|item| item.id).ok_or_else(|| {
            ResolveError::ChannelResolutionFailed(format!("No channel found for {param}={tail}"))
        })?;

        tracing::debug!(channel_url = %channel_url, channel_id = %id, "Resolved channel id");
        Ok(id)
    }

    /// Page through `search.list` for every video on the channel, newest
    /// first. Pages are fetched one after another; any failed page fails the
    /// whole enumeration.
    ///
    /// Returns the ids and whether the page cap cut enumeration short.
    pub async fn list_video_ids(&self, channel_id: &str) -> ResolveResult<(Vec<String>, bool)> {
        let key = self.api_key()?;
        let page_size = PAGE_SIZE.to_string();
        let mut videos = Vec::new();
        let mut page_token = String::new();

        for page in 1..=self.max_pages {
            let listing: SearchListResponse = self
                .get_json(
                    "search",
                    &[
                        ("key", key),
                        ("channelId", channel_id),
                        ("part", "id"),
                        ("maxResults", page_size.as_str()),
                        ("order", "date"),
                        ("pageToken", page_token.as_str()),
                        ("type", "video"),
                    ],
                )
                .await
                .map_err(|details| ResolveError::fetch_failed(VIDEOS_CONTEXT, details))?;

            videos.extend(listing.items.into_iter().filter_map(|item| item.id.video_id));

            match listing.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = token,
                None => {
                    tracing::debug!(channel_id, pages = page, videos = videos.len(), "Enumerated channel videos");
                    return Ok((videos, false));
                }
            }
        }

        tracing::warn!(
            channel_id,
            max_pages = self.max_pages,
            videos = videos.len(),
            "Stopped channel enumeration at page cap"
        );
        Ok((videos, true))
    }

    /// Resolve a channel and derive thumbnail URLs for all of its videos.
    pub async fn resolve_channel_thumbnails(
        &self,
        channel_id: Option<&str>,
        channel_url: Option<&str>,
    ) -> ResolveResult<ChannelThumbnails> {
        self.api_key()?;
        let request = ChannelRequest::from_parts(channel_id, channel_url)?;

        let channel_id = self.resolve_channel_id(&request).await?;
        let (video_ids, truncated) = self.list_video_ids(&channel_id).await?;

        Ok(ChannelThumbnails {
            thumbnails: video_ids.into_iter().map(VideoThumbnailRef::new).collect(),
            channel_id,
            truncated,
        })
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
