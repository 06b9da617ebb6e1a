//! Proxy Engine
//!
//! normalize -> derive key -> cache lookup -> (hit: serve) or
//! (miss: fetch -> process -> store -> serve).
//!
//! Each call is independent. Nothing is retried and concurrent identical
//! requests are not coalesced; each miss fetches on its own.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, warn};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::proxy::envelope::DISABLED_ENVELOPE;
use crate::proxy::route::Route;
use crate::proxy::stats::ProxyStats;
use crate::proxy::upstream::UpstreamClient;

/// Where a served body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Hit,
    Fetched,
    Disabled,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Hit => "HIT",
            ReplySource::Fetched => "MISS",
            ReplySource::Disabled => "DISABLED",
        }
    }
}

/// Body to write back to the client.
#[derive(Debug, Clone)]
pub struct ProxyReply {
    pub body: Bytes,
    pub source: ReplySource,
}

// == Proxy Engine ==
#[derive(Clone)]
pub struct ProxyEngine {
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamClient>,
    stats: Arc<ProxyStats>,
}

impl ProxyEngine {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        stats: Arc<ProxyStats>,
    ) -> Self {
        Self {
            cache,
            upstream,
            stats,
        }
    }

    pub fn stats(&self) -> &ProxyStats {
        &self.stats
    }

    /// Serves one GET for `route`.
    pub async fn serve(&self, route: &Route, path: &str, query: Option<&str>) -> Result<ProxyReply> {
        if !route.enabled {
            self.stats.record_disabled();
            return Ok(disabled_reply());
        }

        let provider = &route.provider;

        let request = provider
            .normalize(&route.config, path, query)
            .inspect_err(|e| {
                self.stats.record_rejected();
                warn!("Rejected {} request: {}", route.name, e);
            })?;

        let key = provider.cache_key(&request);

        match self.cache.get(&key).await {
            Ok(Some(body)) => {
                self.stats.record_hit();
                info!("cache hit: {}", key);
                return Ok(ProxyReply {
                    body,
                    source: ReplySource::Hit,
                });
            }
            Ok(None) => self.stats.record_miss(),
            Err(e) => {
                self.stats.record_miss();
                warn!("cache lookup failed for {}, fetching upstream: {}", key, e);
            }
        }

        info!("proxy {} request: {}", route.name, key);

        let response = self.upstream.get(request.url()).await.inspect_err(|e| {
            self.stats.record_failure();
            error!("proxy request error for {}: {}", route.name, e);
        })?;

        if !(200..300).contains(&response.status) {
            warn!(
                "{} upstream answered HTTP {} for {}",
                route.name, response.status, key
            );
        }

        let (body, ttl) = provider
            .process_response(&route.config, response.body)
            .inspect_err(|e| {
                self.stats.record_failure();
                error!("process response error for {}: {}", route.name, e);
            })?;

        self.stats.record_fetch();

        match self.cache.set(&key, body.clone(), ttl).await {
            Ok(()) => info!("cached: {} for {}s", key, ttl.as_secs()),
            Err(e) => warn!("cache store failed for {}: {}", key, e),
        }

        Ok(ProxyReply {
            body,
            source: ReplySource::Fetched,
        })
    }
}

fn disabled_reply() -> ProxyReply {
    ProxyReply {
        body: Bytes::from_static(DISABLED_ENVELOPE.as_bytes()),
        source: ReplySource::Disabled,
    }
}

impl std::fmt::Debug for ProxyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyEngine")
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
