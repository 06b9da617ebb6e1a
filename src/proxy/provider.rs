//! Upstream provider adapters.
//!
//! Each variant knows how to turn a public request into its upstream request,
//! how to key it in the cache and how long a response may be cached.

use std::time::Duration;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

use crate::config::BAD_REQUEST_CACHE_TTL;
use crate::error::{ProxyError, Result};
use crate::proxy::envelope::GiantBombEnvelope;
use crate::proxy::params::QueryParams;
use crate::proxy::route::RouteConfig;

/// Public prefix of the media-catalog routes.
pub const GIANTBOMB_PUBLIC_ROOT: &str = "/api/1/giantbomb";
const GIANTBOMB_API_ROOT: &str = "/api";

/// Public path of the video-search route.
pub const YOUTUBE_PUBLIC_ROOT: &str = "/api/1/youtube/unarchived_videos";
const YOUTUBE_SEARCH_PATH: &str = "/youtube/v3/search";

/// Parameters the catalog proxy owns. Client values are discarded.
const GIANTBOMB_CONTROLLED: &[&str] = &["api_key", "format", "limit"];

/// Parameters the video-search proxy owns. Client values are discarded.
const YOUTUBE_CONTROLLED: &[&str] = &["part", "maxResults", "type", "channelId", "key", "order"];

const YOUTUBE_PAGE_SIZE: &str = "50";

// == Normalized Request ==
/// The exact outbound request derived from one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    url: Url,
}

impl NormalizedRequest {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path and query, as sent on the request line.
    pub fn request_uri(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

// == Cache Key Derivation ==
/// Derives the cache key for a normalized request URI.
///
/// Pure and bounded in length. The namespace keeps providers apart even when
/// their paths coincide, and hashing keeps credentials out of the key.
pub fn derive_cache_key(namespace: &str, request_uri: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_uri.as_bytes());
    format!("{}/{}", namespace, hex::encode(hasher.finalize()))
}

// == Provider Adapters ==
/// Media-catalog upstream.
#[derive(Debug, Clone)]
pub struct GiantBomb {
    base: Url,
    api_key: String,
}

impl GiantBomb {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base: parse_base(base_url)?,
            api_key: api_key.into(),
        })
    }
}

/// Video-search upstream, restricted to one channel.
#[derive(Debug, Clone)]
pub struct YouTube {
    base: Url,
    api_key: String,
    channel_id: String,
}

impl YouTube {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            base: parse_base(base_url)?,
            api_key: api_key.into(),
            channel_id: channel_id.into(),
        })
    }
}

/// The closed set of upstreams the proxy fronts.
#[derive(Debug, Clone)]
pub enum Provider {
    GiantBomb(GiantBomb),
    YouTube(YouTube),
}

impl Provider {
    /// Cache namespace of this provider.
    pub fn namespace(&self) -> &'static str {
        match self {
            Provider::GiantBomb(_) => "giantbomb",
            Provider::YouTube(_) => "youtube",
        }
    }

    // == Normalize ==
    /// Rewrites an inbound path and query into the upstream request.
    ///
    /// Controlled parameters are dropped, the rest are validated against the
    /// route's rules, and provider parameters are injected last so clients
    /// can never override them.
    pub fn normalize(
        &self,
        route: &RouteConfig,
        path: &str,
        raw_query: Option<&str>,
    ) -> Result<NormalizedRequest> {
        let mut query = QueryParams::parse(raw_query.unwrap_or_default());

        let mut url = match self {
            Provider::GiantBomb(gb) => {
                let url = rewrite_path(&gb.base, path, GIANTBOMB_PUBLIC_ROOT, GIANTBOMB_API_ROOT)?;
                strip_and_validate(&mut query, GIANTBOMB_CONTROLLED, route)?;

                query.append("api_key", &gb.api_key);
                query.append("format", "json");
                url
            }
            Provider::YouTube(yt) => {
                let url = rewrite_path(&yt.base, path, YOUTUBE_PUBLIC_ROOT, YOUTUBE_SEARCH_PATH)?;
                strip_and_validate(&mut query, YOUTUBE_CONTROLLED, route)?;

                query.append("part", "snippet");
                query.append("maxResults", YOUTUBE_PAGE_SIZE);
                query.append("type", "video");
                query.append("channelId", &yt.channel_id);
                query.append("key", &yt.api_key);

                // Without a search term, list the channel newest first.
                if query.get_first("q").unwrap_or_default().is_empty() {
                    query.remove("q");
                    query.append("order", "date");
                }
                url
            }
        };

        url.set_query(Some(&query.encode()));

        debug!("Normalized {} request for {}", self.namespace(), url.path());
        Ok(NormalizedRequest { url })
    }

    // == Cache Key ==
    pub fn cache_key(&self, request: &NormalizedRequest) -> String {
        derive_cache_key(self.namespace(), &request.request_uri())
    }

    // == Process Response ==
    /// Decides how long an upstream body may be cached.
    ///
    /// The returned bytes are always the input bytes, untouched.
    pub fn process_response(&self, route: &RouteConfig, body: Bytes) -> Result<(Bytes, Duration)> {
        match self {
            Provider::GiantBomb(_) => {
                let envelope = GiantBombEnvelope::parse(&body)
                    .map_err(|e| ProxyError::UpstreamParse(e.to_string()))?;

                if envelope.is_success() {
                    Ok((body, route.ttl))
                } else {
                    warn!(
                        "Bad status returned by content provider: {}: {} {}",
                        envelope.status_code, envelope.error, envelope.message
                    );
                    Ok((body, BAD_REQUEST_CACHE_TTL))
                }
            }
            Provider::YouTube(_) => Ok((body, route.ttl)),
        }
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| ProxyError::Config(format!("invalid upstream url {}: {}", base_url, e)))?;

    if url.cannot_be_a_base() {
        return Err(ProxyError::Config(format!(
            "upstream url {} cannot be a base",
            base_url
        )));
    }
    Ok(url)
}

/// True if any segment of `path` is `.` or `..`, raw or percent-encoded.
///
/// `Url::set_path` resolves such segments, which would move the outbound
/// request off the matched route.
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

fn rewrite_path(base: &Url, path: &str, public_root: &str, upstream_root: &str) -> Result<Url> {
    let rest = path
        .strip_prefix(public_root)
        .filter(|rest| !has_dot_segment(rest))
        .ok_or_else(|| ProxyError::RouteNotFound(path.to_string()))?;

    let mut url = base.clone();
    url.set_path(&format!("{}{}", upstream_root, rest));
    Ok(url)
}

fn strip_and_validate(
    query: &mut QueryParams,
    controlled: &[&str],
    route: &RouteConfig,
) -> Result<()> {
    for name in controlled {
        query.remove(name);
    }

    for (name, values) in query.iter() {
        if !route.accepts(name, values) {
            return Err(ProxyError::InvalidQueryParameter(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        GAME_DETAIL_CACHE_TTL, LIST_REQUEST_CACHE_TTL, PAGE_SIZE, VALID_VIDEO_CATEGORIES,
    };
    use crate::proxy::params::ParamRule;

    fn giantbomb() -> Provider {
        Provider::GiantBomb(GiantBomb::new("https://www.giantbomb.com", "secret").unwrap())
    }

    fn youtube() -> Provider {
        Provider::YouTube(
            YouTube::new("https://www.googleapis.com", "yt-secret", "UCchannel").unwrap(),
        )
    }

    fn game_list() -> RouteConfig {
        RouteConfig::new(LIST_REQUEST_CACHE_TTL)
            .allow("offset", ParamRule::PageAlignedOffset(PAGE_SIZE))
            .allow("sort", ParamRule::Literal("date_added:desc"))
    }

    fn search() -> RouteConfig {
        RouteConfig::new(LIST_REQUEST_CACHE_TTL)
            .allow("q", ParamRule::FreeText)
            .allow("pageToken", ParamRule::FreeText)
    }

    #[test]
    fn test_giantbomb_rewrite_and_inject() {
        let request = giantbomb()
            .normalize(
                &game_list(),
                "/api/1/giantbomb/games/",
                Some("sort=date_added:desc&offset=200"),
            )
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://www.giantbomb.com/api/games/?api_key=secret&format=json&offset=200&sort=date_added%3Adesc"
        );
    }

    #[test]
    fn test_giantbomb_strips_client_overrides() {
        let request = giantbomb()
            .normalize(
                &game_list(),
                "/api/1/giantbomb/games/",
                Some("api_key=stolen&format=xml&limit=1000&limit=5"),
            )
            .unwrap();

        assert_eq!(request.request_uri(), "/api/games/?api_key=secret&format=json");
    }

    #[test]
    fn test_giantbomb_rejects_unknown_and_invalid() {
        let provider = giantbomb();
        let route = game_list();

        for query in [
            "offset=37",
            "offset=100&offset=200",
            "sort=name:asc",
            "field_list=id",
            "filter=platforms:94",
        ] {
            let result = provider.normalize(&route, "/api/1/giantbomb/games/", Some(query));
            assert!(
                matches!(result, Err(ProxyError::InvalidQueryParameter(_))),
                "{} should be rejected",
                query
            );
        }
    }

    #[test]
    fn test_giantbomb_detail_route_takes_no_params() {
        let route = RouteConfig::new(GAME_DETAIL_CACHE_TTL);
        let provider = giantbomb();

        let request = provider
            .normalize(&route, "/api/1/giantbomb/game/3030-4725/", None)
            .unwrap();
        assert_eq!(
            request.request_uri(),
            "/api/game/3030-4725/?api_key=secret&format=json"
        );

        let result = provider.normalize(&route, "/api/1/giantbomb/game/3030-4725/", Some("x=1"));
        assert!(matches!(result, Err(ProxyError::InvalidQueryParameter(name)) if name == "x"));
    }

    #[test]
    fn test_video_type_is_validated_and_forwarded() {
        let route = RouteConfig::new(LIST_REQUEST_CACHE_TTL)
            .allow("offset", ParamRule::PageAlignedOffset(PAGE_SIZE))
            .allow("video_type", ParamRule::Category(VALID_VIDEO_CATEGORIES));
        let provider = giantbomb();

        let request = provider
            .normalize(&route, "/api/1/giantbomb/videos/", Some("video_type=3"))
            .unwrap();
        assert!(request.request_uri().ends_with("&video_type=3"));

        let result = provider.normalize(&route, "/api/1/giantbomb/videos/", Some("video_type=9"));
        assert!(result.is_err());
    }

    #[test]
    fn test_youtube_without_query_orders_by_date() {
        let request = youtube()
            .normalize(&search(), YOUTUBE_PUBLIC_ROOT, Some("q=&key=mine&order=rating"))
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://www.googleapis.com/youtube/v3/search?channelId=UCchannel&key=yt-secret&maxResults=50&order=date&part=snippet&type=video"
        );
    }

    #[test]
    fn test_youtube_with_query() {
        let request = youtube()
            .normalize(&search(), YOUTUBE_PUBLIC_ROOT, Some("q=bombcast&pageToken=CDIQAA"))
            .unwrap();

        let uri = request.request_uri();
        assert!(uri.contains("q=bombcast"));
        assert!(uri.contains("pageToken=CDIQAA"));
        assert!(!uri.contains("order="));
    }

    #[test]
    fn test_youtube_rejects_duplicates() {
        let result = youtube().normalize(&search(), YOUTUBE_PUBLIC_ROOT, Some("q=a&q=b"));
        assert!(matches!(result, Err(ProxyError::InvalidQueryParameter(_))));
    }

    #[test]
    fn test_cache_key_ignores_param_order() {
        let provider = giantbomb();
        let route = game_list();

        let a = provider
            .normalize(&route, "/api/1/giantbomb/games/", Some("offset=100&sort=date_added:desc"))
            .unwrap();
        let b = provider
            .normalize(&route, "/api/1/giantbomb/games/", Some("sort=date_added:desc&offset=100"))
            .unwrap();
        let c = provider
            .normalize(&route, "/api/1/giantbomb/games/", Some("offset=200&sort=date_added:desc"))
            .unwrap();

        assert_eq!(provider.cache_key(&a), provider.cache_key(&b));
        assert_ne!(provider.cache_key(&a), provider.cache_key(&c));
    }

    #[test]
    fn test_cache_key_is_namespaced() {
        let gb = derive_cache_key("giantbomb", "/same?x=1");
        let yt = derive_cache_key("youtube", "/same?x=1");

        assert_ne!(gb, yt);
        assert!(gb.starts_with("giantbomb/"));
        assert_eq!(gb.len(), "giantbomb/".len() + 64);
        assert!(!gb.contains("x=1"));
    }

    #[test]
    fn test_process_response_ttls() {
        let provider = giantbomb();
        let route = RouteConfig::new(GAME_DETAIL_CACHE_TTL);

        let ok = Bytes::from_static(br#"{"status_code":1,"error":"OK","results":{}}"#);
        let (body, ttl) = provider.process_response(&route, ok.clone()).unwrap();
        assert_eq!(body, ok);
        assert_eq!(ttl, GAME_DETAIL_CACHE_TTL);

        let bad = Bytes::from_static(br#"{"status_code":101,"error":"Object Not Found"}"#);
        let (body, ttl) = provider.process_response(&route, bad.clone()).unwrap();
        assert_eq!(body, bad);
        assert_eq!(ttl, BAD_REQUEST_CACHE_TTL);
    }

    #[test]
    fn test_process_response_null_fields_still_succeed() {
        let body =
            Bytes::from_static(br#"{"status_code":1,"error":"OK","message":null,"results":[]}"#);
        let (served, ttl) = giantbomb()
            .process_response(&RouteConfig::new(GAME_DETAIL_CACHE_TTL), body.clone())
            .unwrap();

        assert_eq!(served, body);
        assert_eq!(ttl, GAME_DETAIL_CACHE_TTL);
    }

    #[test]
    fn test_dot_segments_detected() {
        assert!(has_dot_segment("/api/1/giantbomb/video_types/../platforms/"));
        assert!(has_dot_segment("/video_types/%2e%2e/%2E%2E/admin"));
        assert!(has_dot_segment("/video_types/.%2e/admin"));
        assert!(has_dot_segment("/games/./"));
        assert!(has_dot_segment("/games/..\\admin"));

        assert!(!has_dot_segment("/api/1/giantbomb/game/3030-1/"));
        assert!(!has_dot_segment("/games/...hidden/"));
        assert!(!has_dot_segment("/games/v1.2/"));
    }

    #[test]
    fn test_dot_segments_never_reach_upstream() {
        let provider = giantbomb();
        let route = RouteConfig::new(GAME_DETAIL_CACHE_TTL);

        for path in [
            "/api/1/giantbomb/video_types/../platforms/",
            "/api/1/giantbomb/video_types/%2e%2e/%2e%2e/%2e%2e/admin",
        ] {
            let result = provider.normalize(&route, path, None);
            assert!(matches!(result, Err(ProxyError::RouteNotFound(_))), "{}", path);
        }
    }

    #[test]
    fn test_process_response_keeps_exact_bytes() {
        // Whitespace and key order must survive.
        let raw = Bytes::from_static(b"{ \"results\" : [] ,\n \"status_code\":105 }");
        let (body, _) = giantbomb()
            .process_response(&RouteConfig::new(GAME_DETAIL_CACHE_TTL), raw.clone())
            .unwrap();

        assert_eq!(body, raw);
    }

    #[test]
    fn test_process_response_parse_error() {
        let result = giantbomb().process_response(
            &RouteConfig::new(GAME_DETAIL_CACHE_TTL),
            Bytes::from_static(b"<html>502</html>"),
        );
        assert!(matches!(result, Err(ProxyError::UpstreamParse(_))));
    }

    #[test]
    fn test_youtube_ttl_is_unconditional() {
        let route = search();
        let (_, ttl) = youtube()
            .process_response(&route, Bytes::from_static(b"not even json"))
            .unwrap();

        assert_eq!(ttl, route.ttl);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GiantBomb::new("not a url", "k"),
            Err(ProxyError::Config(_))
        ));
    }
}
