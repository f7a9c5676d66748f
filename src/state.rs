use std::sync::Arc;

use crate::config::Config;
use crate::resolver::{OgResolver, ResolveResult, YouTubeClient};

/// Shared application state passed to all handlers and extractors.
/// Resolvers are built once at startup so their HTTP clients reuse
/// connections across requests.
#[derive(Clone)]
pub struct AppState {
    pub og: OgResolver,
    pub youtube: YouTubeClient,
    pub access_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> ResolveResult<Self> {
        Ok(AppState {
            og: OgResolver::new(config.og_timeout, !config.allow_private_hosts)?,
            youtube: YouTubeClient::new(
                config.youtube_api_key.clone(),
                config.youtube_api_base.clone(),
                config.youtube_timeout,
                config.youtube_max_pages,
            )?,
            access_secret: config.access_secret.as_deref().map(Arc::from),
        })
    }
}
