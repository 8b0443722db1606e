// src/health/aggregator.rs
use crate::health::probe::{DependencyProbe, ProbeResult, ProbeStatus};
use crate::metrics::MetricsCollector;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, warn};

/// One aggregation report: the combined verdict plus the per-dependency
/// results it was derived from. Transient, never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct OverallHealth {
    pub status: ProbeStatus,
    pub timestamp: DateTime<Utc>,
    pub database: ProbeResult,
    pub redis: ProbeResult,
}

impl OverallHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == ProbeStatus::Healthy
    }
}

/// Fans the configured probes out as independent tasks and folds their
/// results into a single readiness verdict.
pub struct HealthAggregator {
    database: Arc<dyn DependencyProbe>,
    redis: Arc<dyn DependencyProbe>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthAggregator {
    pub fn new(database: Arc<dyn DependencyProbe>, redis: Arc<dyn DependencyProbe>) -> Self {
        Self {
            database,
            redis,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run both probes concurrently and combine their outcomes.
    ///
    /// Both tasks start at effectively the same instant, so total
    /// latency tracks the slower probe rather than the sum. The
    /// aggregator itself has no timeout: each probe bounds its own
    /// wait.
    pub async fn check_overall_health(&self) -> OverallHealth {
        let start = Instant::now();

        // One task per dependency, so a slow or panicking probe cannot
        // hold up or take down its sibling.
        let database_task = tokio::spawn({
            let probe = self.database.clone();
            async move { probe.probe().await }
        });
        let redis_task = tokio::spawn({
            let probe = self.redis.clone();
            async move { probe.probe().await }
        });

        let (database, redis) = tokio::join!(database_task, redis_task);
        let database = recover(database, self.database.name(), start);
        let redis = recover(redis, self.redis.name(), start);

        let status = if database.is_healthy() && redis.is_healthy() {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_probe(self.database.name(), &database);
            metrics.record_probe(self.redis.name(), &redis);
            metrics.update_readiness(status == ProbeStatus::Healthy);
        }

        debug!(
            "Health check complete: {} ({}ms)",
            status.as_str(),
            start.elapsed().as_millis()
        );

        OverallHealth {
            status,
            timestamp: Utc::now(),
            database,
            redis,
        }
    }
}

/// Fold a task failure into an unhealthy result instead of letting it
/// escape to the HTTP layer.
fn recover(joined: Result<ProbeResult, JoinError>, name: &str, start: Instant) -> ProbeResult {
    match joined {
        Ok(result) => result,
        Err(e) => {
            warn!("{} probe task failed: {}", name, e);
            ProbeResult::unhealthy(format!("{} probe task failed", name), start.elapsed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    struct StubProbe {
        name: &'static str,
        healthy: bool,
        delay: Duration,
        started_at: Mutex<Option<Instant>>,
        panics: bool,
    }

    impl StubProbe {
        fn new(name: &'static str, healthy: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                healthy,
                delay: Duration::ZERO,
                started_at: Mutex::new(None),
                panics: false,
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                healthy: true,
                delay,
                started_at: Mutex::new(None),
                panics: false,
            })
        }

        fn panicking(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                healthy: true,
                delay: Duration::ZERO,
                started_at: Mutex::new(None),
                panics: true,
            })
        }

        fn started_at(&self) -> Instant {
            self.started_at.lock().unwrap().expect("probe never ran")
        }
    }

    #[async_trait]
    impl DependencyProbe for StubProbe {
        async fn probe(&self) -> ProbeResult {
            *self.started_at.lock().unwrap() = Some(Instant::now());

            if self.panics {
                panic!("boom");
            }

            sleep(self.delay).await;

            if self.healthy {
                ProbeResult::healthy("up", self.delay)
            } else {
                ProbeResult::unhealthy("down", self.delay)
            }
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn aggregator(database_healthy: bool, redis_healthy: bool) -> HealthAggregator {
        HealthAggregator::new(
            StubProbe::new("database", database_healthy),
            StubProbe::new("redis", redis_healthy),
        )
    }

    #[tokio::test]
    async fn overall_is_healthy_only_when_both_probes_are() {
        let cases = [
            (true, true, ProbeStatus::Healthy),
            (true, false, ProbeStatus::Unhealthy),
            (false, true, ProbeStatus::Unhealthy),
            (false, false, ProbeStatus::Unhealthy),
        ];

        for (database, redis, expected) in cases {
            let report = aggregator(database, redis).check_overall_health().await;
            assert_eq!(report.status, expected, "case ({database}, {redis})");
        }
    }

    #[tokio::test]
    async fn probes_run_concurrently_not_serially() {
        let database = StubProbe::slow("database", Duration::from_millis(50));
        let redis = StubProbe::slow("redis", Duration::from_millis(50));
        let aggregator = HealthAggregator::new(database.clone(), redis.clone());

        let start = Instant::now();
        let report = aggregator.check_overall_health().await;
        let elapsed = start.elapsed();

        assert!(report.is_healthy());

        // Two 50ms probes finishing under 100ms proves fan-out.
        assert!(elapsed < Duration::from_millis(100), "took {:?}", elapsed);

        let skew = {
            let (a, b) = (database.started_at(), redis.started_at());
            if a > b {
                a - b
            } else {
                b - a
            }
        };
        assert!(skew < Duration::from_millis(10), "start skew {:?}", skew);
    }

    #[tokio::test]
    async fn repeated_checks_are_consistent() {
        let aggregator = aggregator(true, false);

        let first = aggregator.check_overall_health().await;
        let second = aggregator.check_overall_health().await;

        assert_eq!(first.status, second.status);
        assert_eq!(first.database.status, second.database.status);
        assert_eq!(first.redis.status, second.redis.status);
    }

    #[tokio::test]
    async fn a_panicking_probe_cannot_take_down_its_sibling() {
        let aggregator = HealthAggregator::new(
            StubProbe::panicking("database"),
            StubProbe::new("redis", true),
        );

        let report = aggregator.check_overall_health().await;

        assert_eq!(report.status, ProbeStatus::Unhealthy);
        assert!(!report.database.is_healthy());
        assert!(report.redis.is_healthy());
    }
}
