//! Proxy Module
//!
//! Request normalization, route policy, provider adapters and the engine
//! that ties them to the cache and the upstream client.

pub mod engine;
pub mod envelope;
pub mod params;
pub mod provider;
pub mod route;
pub mod stats;
pub mod upstream;


pub use engine::{ProxyEngine, ProxyReply, ReplySource};
pub use envelope::{GiantBombEnvelope, DISABLED_ENVELOPE};
pub use params::{ParamRule, QueryParams};
pub use provider::{derive_cache_key, GiantBomb, NormalizedRequest, Provider, YouTube};
pub use route::{Route, RouteConfig, RouteTable};
pub use stats::{ProxyStats, StatsSnapshot};
pub use upstream::{HttpUpstream, UpstreamClient, UpstreamResponse};
