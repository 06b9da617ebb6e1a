//! Route policy table.
//!
//! Every public endpoint is a row: the path it answers, the upstream it
//! fronts, which query parameters it accepts and for how long responses are
//! cached. The table is built once at startup and never mutated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{
    Config, DEFAULT_CACHE_TTL, GAME_DETAIL_CACHE_TTL, LIST_REQUEST_CACHE_TTL, PAGE_SIZE,
    VALID_VIDEO_CATEGORIES, VIDEO_DETAIL_CACHE_TTL,
};
use crate::error::Result;
use crate::proxy::params::ParamRule;
use crate::proxy::provider::{has_dot_segment, GiantBomb, Provider, YouTube, YOUTUBE_PUBLIC_ROOT};

// == Route Config ==
/// Validation rules and success TTL of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub allowed_params: HashMap<&'static str, ParamRule>,
    pub ttl: Duration,
}

impl RouteConfig {
    /// A route that accepts no client parameters.
    pub fn new(ttl: Duration) -> Self {
        Self {
            allowed_params: HashMap::new(),
            ttl,
        }
    }

    pub fn allow(mut self, name: &'static str, rule: ParamRule) -> Self {
        self.allowed_params.insert(name, rule);
        self
    }

    /// True if `name` is allowed and all of its values pass its rule.
    pub fn accepts(&self, name: &str, values: &[String]) -> bool {
        self.allowed_params
            .get(name)
            .is_some_and(|rule| rule.check(values))
    }
}

// == Route ==
#[derive(Debug, Clone)]
pub struct Route {
    /// Short name used in logs
    pub name: &'static str,
    /// A pattern ending in `/` matches its whole subtree, any other pattern
    /// matches exactly.
    pub pattern: &'static str,
    pub provider: Arc<Provider>,
    pub config: RouteConfig,
    /// When false the route serves the disabled envelope.
    pub enabled: bool,
}

impl Route {
    pub fn matches(&self, path: &str) -> bool {
        if self.pattern.ends_with('/') {
            path.starts_with(self.pattern)
        } else {
            path == self.pattern
        }
    }
}

// == Route Table ==
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Builds the public route set from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let giantbomb = Arc::new(Provider::GiantBomb(GiantBomb::new(
            &config.giantbomb_base_url,
            config.giantbomb_api_key.clone(),
        )?));
        let youtube = Arc::new(Provider::YouTube(YouTube::new(
            &config.youtube_base_url,
            config.youtube_api_key.clone(),
            config.youtube_channel_id.clone(),
        )?));

        let offset = ParamRule::PageAlignedOffset(PAGE_SIZE);
        let on = config.proxy_enabled;

        let catalog = |name: &'static str, pattern: &'static str, policy: RouteConfig, enabled| {
            Route {
                name,
                pattern,
                provider: giantbomb.clone(),
                config: policy,
                enabled,
            }
        };

        let routes = vec![
            catalog(
                "videos",
                "/api/1/giantbomb/videos/",
                RouteConfig::new(LIST_REQUEST_CACHE_TTL)
                    .allow("offset", offset)
                    // Validated only; the upstream receives it verbatim.
                    .allow("video_type", ParamRule::Category(VALID_VIDEO_CATEGORIES)),
                on,
            ),
            catalog(
                "video",
                "/api/1/giantbomb/video/",
                RouteConfig::new(VIDEO_DETAIL_CACHE_TTL),
                on,
            ),
            catalog(
                "games",
                "/api/1/giantbomb/games/",
                RouteConfig::new(LIST_REQUEST_CACHE_TTL)
                    .allow("offset", offset)
                    .allow("sort", ParamRule::Literal("date_added:desc")),
                on,
            ),
            catalog(
                "game",
                "/api/1/giantbomb/game/",
                RouteConfig::new(GAME_DETAIL_CACHE_TTL),
                on,
            ),
            catalog(
                "video_types",
                "/api/1/giantbomb/video_types/",
                RouteConfig::new(DEFAULT_CACHE_TTL),
                on,
            ),
            catalog(
                "search",
                "/api/1/giantbomb/search/",
                RouteConfig::new(DEFAULT_CACHE_TTL)
                    .allow("query", ParamRule::FreeText)
                    // The one resource combination the client sends.
                    .allow("resources", ParamRule::Literal("game,video,")),
                on && config.search_proxy_enabled,
            ),
            Route {
                name: "unarchived_videos",
                pattern: YOUTUBE_PUBLIC_ROOT,
                provider: youtube,
                config: RouteConfig::new(DEFAULT_CACHE_TTL)
                    .allow("q", ParamRule::FreeText)
                    .allow("pageToken", ParamRule::FreeText),
                enabled: on,
            },
        ];

        Ok(Self::new(routes))
    }

    /// Longest matching pattern wins. Paths with `.` or `..` segments match
    /// nothing.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        if has_dot_segment(path) {
            return None;
        }
        self.routes
            .iter()
            .filter(|route| route.matches(path))
            .max_by_key(|route| route.pattern.len())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
