use std::env;
use std::time::Duration;

use crate::resolver::{og, youtube};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub is_dev: bool,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base: String,
    pub youtube_timeout: Duration,
    pub youtube_max_pages: usize,
    pub og_timeout: Duration,
    pub allow_private_hosts: bool,
    pub access_secret: Option<String>,
    /// Origins allowed to call the API cross-origin. `*` allows any.
    pub allowed_origins: Vec<String>,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from `.env` (if present) and the process environment. Every
    /// setting has a default; the YouTube key and access secret are optional.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5174);

        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port,
            is_dev: env::var("APP_ENV").as_deref() != Ok("production"),
            youtube_api_key: non_empty(youtube::API_KEY_VAR),
            youtube_api_base: non_empty("YOUTUBE_API_BASE")
                .unwrap_or_else(|| youtube::DEFAULT_API_BASE.to_string()),
            youtube_timeout: Duration::from_secs(parse_or(
                "YOUTUBE_TIMEOUT_SECS",
                youtube::API_TIMEOUT.as_secs(),
            )),
            youtube_max_pages: parse_or("YOUTUBE_MAX_PAGES", youtube::DEFAULT_MAX_PAGES),
            og_timeout: Duration::from_millis(parse_or(
                "OG_TIMEOUT_MS",
                og::FETCH_TIMEOUT.as_millis() as u64,
            )),
            allow_private_hosts: parse_or("ALLOW_PRIVATE_HOSTS", false),
            access_secret: non_empty("ACCESS_SECRET"),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().trim_end_matches('/').to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
