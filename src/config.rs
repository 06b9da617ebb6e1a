//! Configuration Module
//!
//! Handles loading server configuration from environment variables and
//! holds the fixed caching policy constants.

use std::env;
use std::str::FromStr;
use std::time::Duration;

// == Policy Constants ==
/// TTL for routes without a more specific policy.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// TTL for paginated list routes.
pub const LIST_REQUEST_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

pub const GAME_DETAIL_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

pub const VIDEO_DETAIL_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// TTL applied when the upstream answers with a non-success status code.
pub const BAD_REQUEST_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Page size of the catalog upstream. Offsets must be aligned to it.
pub const PAGE_SIZE: i64 = 100;

/// Video category identifiers accepted by the `video_type` filter.
pub const VALID_VIDEO_CATEGORIES: &[i64] = &[2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13];

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the in-process cache can hold
    pub max_entries: usize,
    /// Outbound request timeout in seconds
    pub upstream_timeout: u64,
    /// Origin of the media-catalog upstream
    pub giantbomb_base_url: String,
    /// Credential injected into every catalog request
    pub giantbomb_api_key: String,
    /// Origin of the video-search upstream
    pub youtube_base_url: String,
    /// Credential injected into every video-search request
    pub youtube_api_key: String,
    /// Channel searched by the unarchived videos route
    pub youtube_channel_id: String,
    /// Global proxy switch
    pub proxy_enabled: bool,
    /// Switch for the catalog search route
    pub search_proxy_enabled: bool,
    /// Redirect target for `GET /`
    pub client_download_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `UPSTREAM_TIMEOUT` - Outbound timeout in seconds (default: 10)
    /// - `GIANTBOMB_BASE_URL`, `GIANTBOMB_API_KEY`
    /// - `YOUTUBE_BASE_URL`, `YOUTUBE_API_KEY`, `YOUTUBE_CHANNEL_ID`
    /// - `PROXY_ENABLED`, `SEARCH_PROXY_ENABLED` (default: true)
    /// - `CLIENT_DOWNLOAD_URL` (default: empty, `/` answers 404)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed("SERVER_PORT", defaults.server_port),
            max_entries: parsed("MAX_ENTRIES", defaults.max_entries),
            upstream_timeout: parsed("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            giantbomb_base_url: string("GIANTBOMB_BASE_URL", defaults.giantbomb_base_url),
            giantbomb_api_key: string("GIANTBOMB_API_KEY", defaults.giantbomb_api_key),
            youtube_base_url: string("YOUTUBE_BASE_URL", defaults.youtube_base_url),
            youtube_api_key: string("YOUTUBE_API_KEY", defaults.youtube_api_key),
            youtube_channel_id: string("YOUTUBE_CHANNEL_ID", defaults.youtube_channel_id),
            proxy_enabled: parsed("PROXY_ENABLED", defaults.proxy_enabled),
            search_proxy_enabled: parsed("SEARCH_PROXY_ENABLED", defaults.search_proxy_enabled),
            client_download_url: string("CLIENT_DOWNLOAD_URL", defaults.client_download_url),
        }
    }

    /// Outbound request timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            max_entries: 10_000,
            upstream_timeout: 10,
            giantbomb_base_url: "https://www.giantbomb.com".to_string(),
            giantbomb_api_key: String::new(),
            youtube_base_url: "https://www.googleapis.com".to_string(),
            youtube_api_key: String::new(),
            youtube_channel_id: String::new(),
            proxy_enabled: true,
            search_proxy_enabled: true,
            client_download_url: String::new(),
        }
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string(name: &str, default: String) -> String {
    env::var(name).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert!(config.proxy_enabled);
        assert!(config.search_proxy_enabled);
        assert!(config.client_download_url.is_empty());
    }

    #[test]
    fn test_policy_constants() {
        assert_eq!(LIST_REQUEST_CACHE_TTL, BAD_REQUEST_CACHE_TTL);
        assert!(VIDEO_DETAIL_CACHE_TTL > GAME_DETAIL_CACHE_TTL);
        assert!(!VALID_VIDEO_CATEGORIES.contains(&9));
    }

    #[test]
    fn test_parsed_falls_back_on_garbage() {
        env::set_var("CACHE_PROXY_TEST_PORT", "not-a-port");
        assert_eq!(parsed("CACHE_PROXY_TEST_PORT", 3000u16), 3000);

        env::set_var("CACHE_PROXY_TEST_PORT", "4000");
        assert_eq!(parsed("CACHE_PROXY_TEST_PORT", 3000u16), 4000);

        env::remove_var("CACHE_PROXY_TEST_PORT");
    }
}
