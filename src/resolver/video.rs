use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use url::Url;

pub const THUMBNAIL_HOST: &str = "https://i3.ytimg.com/vi";
pub const SHORT_LINK_HOST: &str = "youtu.be";
pub const LONG_FORM_DOMAIN: &str = "youtube.com";
pub const VIDEO_ID_LEN: usize = 11;

// ── Thumbnail quality ──────────────────────────────────────────────────────

/// Named thumbnail resolutions served for every video.
///
/// Variants are declared lowest first so the derived `Ord` follows
/// resolution: `Default < Medium < High < Standard < MaxRes`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum ThumbnailQuality {
    #[strum(serialize = "default")]
    #[serde(rename = "default")]
    Default,
    #[strum(serialize = "mqdefault")]
    #[serde(rename = "mqdefault")]
    Medium,
    #[strum(serialize = "hqdefault")]
    #[serde(rename = "hqdefault")]
    High,
    #[strum(serialize = "sddefault")]
    #[serde(rename = "sddefault")]
    Standard,
    #[strum(serialize = "maxresdefault")]
    #[serde(rename = "maxresdefault")]
    MaxRes,
}

/// Fallback precedence, highest resolution first.
pub const FALLBACK_ORDER: [ThumbnailQuality; 5] = [
    ThumbnailQuality::MaxRes,
    ThumbnailQuality::Standard,
    ThumbnailQuality::High,
    ThumbnailQuality::Medium,
    ThumbnailQuality::Default,
];

/// Returns the next lower quality tier, or `None` once `default` is reached.
pub fn next_fallback_quality(current: ThumbnailQuality) -> Option<ThumbnailQuality> {
    let idx = FALLBACK_ORDER.iter().position(|q| *q == current)?;
    FALLBACK_ORDER.get(idx + 1).copied()
}

pub fn thumbnail_url(video_id: &str, quality: ThumbnailQuality) -> String {
    format!("{THUMBNAIL_HOST}/{video_id}/{quality}.jpg")
}

// ── Video ids ──────────────────────────────────────────────────────────────

/// `true` for exactly 11 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extract the video id from a watch link (`youtube.com/watch?v=<id>`) or a
/// short link (`youtu.be/<id>`).
///
/// Anything else, including unparsable input, is a lookup miss and yields
/// `None`.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;

    let candidate = if host == SHORT_LINK_HOST {
        parsed.path().trim_start_matches('/').to_string()
    } else if host.contains(LONG_FORM_DOMAIN) {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    is_valid_video_id(&candidate).then_some(candidate)
}

/// Thumbnail URLs for one video: the max-resolution image and the
/// `hqdefault` image every video is guaranteed to have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoThumbnailRef {
    pub video_id: String,
    pub primary_thumbnail_url: String,
    pub fallback_thumbnail_url: String,
}

impl VideoThumbnailRef {
    pub fn new(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        VideoThumbnailRef {
            primary_thumbnail_url: thumbnail_url(&video_id, ThumbnailQuality::MaxRes),
            fallback_thumbnail_url: thumbnail_url(&video_id, ThumbnailQuality::High),
            video_id,
        }
    }

    /// Thumbnail for a watch or short link; `None` when the link is not a video.
    pub fn from_link(url: &str) -> Option<Self> {
        extract_video_id(url).map(Self::new)
    }
}

// ── Display-time fallback ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Showing(ThumbnailQuality),
    Unavailable,
}

/// Per-video thumbnail state for a display surface.
///
/// A load failure steps that video down one quality tier; once `default`
/// also fails the video is marked unavailable so the surface can show an
/// explicit placeholder instead of a broken image.
#[derive(Debug, Clone)]
pub struct ThumbnailDisplay {
    initial: ThumbnailQuality,
    current: HashMap<String, ThumbnailQuality>,
    unavailable: HashSet<String>,
}

impl ThumbnailDisplay {
    pub fn new(initial: ThumbnailQuality) -> Self {
        ThumbnailDisplay {
            initial,
            current: HashMap::new(),
            unavailable: HashSet::new(),
        }
    }

    pub fn state(&self, video_id: &str) -> DisplayState {
        if self.unavailable.contains(video_id) {
            return DisplayState::Unavailable;
        }
        DisplayState::Showing(self.quality(video_id))
    }

    fn quality(&self, video_id: &str) -> ThumbnailQuality {
        self.current.get(video_id).copied().unwrap_or(self.initial)
    }

    /// URL to render for `video_id`, or `None` when every tier has failed.
    pub fn url(&self, video_id: &str) -> Option<String> {
        match self.state(video_id) {
            DisplayState::Showing(quality) => Some(thumbnail_url(video_id, quality)),
            DisplayState::Unavailable => None,
        }
    }

    pub fn on_load_error(&mut self, video_id: &str) -> DisplayState {
        if self.unavailable.contains(video_id) {
            return DisplayState::Unavailable;
        }
        match next_fallback_quality(self.quality(video_id)) {
            Some(next) => {
                self.current.insert(video_id.to_string(), next);
                DisplayState::Showing(next)
            }
            None => {
                tracing::debug!(video_id, "All thumbnail qualities failed");
                self.unavailable.insert(video_id.to_string());
                DisplayState::Unavailable
            }
        }
    }

    /// Switch `video_id` to `quality`, clearing its error state. Other
    /// videos keep theirs.
    pub fn select_quality(&mut self, video_id: &str, quality: ThumbnailQuality) -> DisplayState {
        self.unavailable.remove(video_id);
        self.current.insert(video_id.to_string(), quality);
        DisplayState::Showing(quality)
    }
}

impl Default for ThumbnailDisplay {
    fn default() -> Self {
        Self::new(ThumbnailQuality::MaxRes)
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
