// src/health/startup.rs
use crate::health::cache::RedisProbe;
use crate::health::probe::DependencyProbe;
use anyhow::{bail, Result};
use tracing::{info, warn};

/// How a deployment role treats the cache at boot. The API can serve
/// traffic without it; the job runner cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Optional,
    Required,
}

/// One-shot boot gate, run before the listener binds.
///
/// This is deliberately a separate call site from steady-state
/// readiness: a missing datastore is fatal here (the caller exits
/// non-zero), while the same failure later merely turns readiness into
/// a 503.
pub async fn run_startup_checks(
    database: &dyn DependencyProbe,
    cache: &RedisProbe,
    policy: CachePolicy,
) -> Result<()> {
    info!("Running startup health checks");

    let result = database.probe().await;
    if !result.is_healthy() {
        bail!(
            "Database startup check failed: {}",
            result.message.as_deref().unwrap_or("no details")
        );
    }
    info!(
        "Database connection verified ({}ms)",
        result.response_time_ms.unwrap_or(0)
    );

    if !cache.is_configured() {
        match policy {
            CachePolicy::Required => {
                bail!("REDIS_URL is not configured, but this role requires the cache")
            }
            CachePolicy::Optional => {
                info!("Redis is not configured, skipping cache startup check");
                return Ok(());
            }
        }
    }

    let result = cache.probe().await;
    if result.is_healthy() {
        info!(
            "Redis connection verified ({}ms)",
            result.response_time_ms.unwrap_or(0)
        );
    } else {
        let message = result.message.as_deref().unwrap_or("no details");
        match policy {
            CachePolicy::Required => bail!("Redis startup check failed: {}", message),
            CachePolicy::Optional => {
                warn!("Redis startup check failed (cache is optional): {}", message);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CacheClient;
    use crate::health::probe::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::time::Duration;

    struct StubProbe {
        healthy: bool,
    }

    #[async_trait]
    impl DependencyProbe for StubProbe {
        async fn probe(&self) -> ProbeResult {
            if self.healthy {
                ProbeResult::healthy("up", Duration::ZERO)
            } else {
                ProbeResult::unhealthy("down", Duration::ZERO)
            }
        }

        fn name(&self) -> &'static str {
            "database"
        }
    }

    struct FakeCache {
        ok: bool,
    }

    #[async_trait]
    impl CacheClient for FakeCache {
        async fn ping(&self) -> Result<String, ProbeError> {
            if self.ok {
                Ok("PONG".to_string())
            } else {
                Err(ProbeError::Connection("refused".to_string()))
            }
        }

        async fn disconnect(&self) {}
    }

    fn cache(ok: bool) -> RedisProbe {
        RedisProbe::new(Some(Arc::new(FakeCache { ok })))
    }

    #[tokio::test]
    async fn database_failure_is_fatal() {
        let result = run_startup_checks(
            &StubProbe { healthy: false },
            &cache(true),
            CachePolicy::Optional,
        )
        .await;

        assert!(result.unwrap_err().to_string().contains("Database"));
    }

    #[tokio::test]
    async fn cache_failure_is_soft_for_the_api_role() {
        let result = run_startup_checks(
            &StubProbe { healthy: true },
            &cache(false),
            CachePolicy::Optional,
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cache_failure_is_fatal_for_the_worker_role() {
        let result = run_startup_checks(
            &StubProbe { healthy: true },
            &cache(false),
            CachePolicy::Required,
        )
        .await;

        assert!(result.unwrap_err().to_string().contains("Redis"));
    }

    #[tokio::test]
    async fn unconfigured_cache_is_fatal_only_when_required() {
        let unconfigured = RedisProbe::new(None);

        let soft = run_startup_checks(
            &StubProbe { healthy: true },
            &unconfigured,
            CachePolicy::Optional,
        )
        .await;
        assert!(soft.is_ok());

        let hard = run_startup_checks(
            &StubProbe { healthy: true },
            &unconfigured,
            CachePolicy::Required,
        )
        .await;
        assert!(hard.unwrap_err().to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn everything_healthy_passes() {
        let result = run_startup_checks(
            &StubProbe { healthy: true },
            &cache(true),
            CachePolicy::Required,
        )
        .await;

        assert!(result.is_ok());
    }
}
