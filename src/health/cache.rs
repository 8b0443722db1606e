// src/health/cache.rs
use crate::clients::CacheClient;
use crate::health::probe::{DependencyProbe, ProbeError, ProbeResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{timeout, Duration, Instant};
use tracing::warn;

/// Expected PING reply.
const PONG: &str = "PONG";

/// Bound on the ping round trip. The losing side of the race is
/// abandoned once the bound elapses, never awaited past it.
const PING_TIMEOUT: Duration = Duration::from_millis(5000);

const HEALTHY_MESSAGE: &str = "Redis connection is healthy";
const NOT_CONFIGURED_MESSAGE: &str = "Redis is not configured (optional)";

/// Checks the cache by racing a PING against a fixed bound.
///
/// A deployment without a cache URL gets the short-circuit path: the
/// probe reports healthy without doing any I/O, so an intentionally
/// unconfigured optional dependency can never fail the aggregate.
pub struct RedisProbe {
    client: Option<Arc<dyn CacheClient>>,
}

impl RedisProbe {
    pub fn new(client: Option<Arc<dyn CacheClient>>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl DependencyProbe for RedisProbe {
    async fn probe(&self) -> ProbeResult {
        let client = match &self.client {
            Some(client) => client,
            None => return ProbeResult::skipped(NOT_CONFIGURED_MESSAGE),
        };

        let start = Instant::now();

        match timeout(PING_TIMEOUT, client.ping()).await {
            Ok(Ok(reply)) if reply == PONG => {
                ProbeResult::healthy(HEALTHY_MESSAGE, start.elapsed())
            }
            Ok(Ok(reply)) => {
                warn!("Redis ping replied with {:?}", reply);
                ProbeResult::unhealthy(
                    ProbeError::UnexpectedResult("Redis ping").to_string(),
                    start.elapsed(),
                )
            }
            Ok(Err(e)) => ProbeResult::unhealthy(e.to_string(), start.elapsed()),
            Err(_) => {
                warn!("Redis ping exceeded {:?}", PING_TIMEOUT);
                ProbeResult::unhealthy(
                    ProbeError::Timeout("Redis ping").to_string(),
                    start.elapsed(),
                )
            }
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
