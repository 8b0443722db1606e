// src/metrics/collector.rs
use crate::health::ProbeResult;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }
}

pub struct MetricsCollector {
    // Request metrics
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,

    // Dependency metrics
    pub health_checks_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,
    pub dependency_up: IntGaugeVec,

    // Aggregate readiness (1=ready, 0=not ready)
    pub service_ready: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> anyhow::Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("api_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "api_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let health_checks_total = IntCounterVec::new(
            Opts::new("api_health_checks_total", "Dependency probes by outcome"),
            &["dependency", "status"],
        )?;
        registry.register(Box::new(health_checks_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "api_probe_duration_seconds",
                "Dependency probe duration in seconds",
            ),
            &["dependency"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let dependency_up = IntGaugeVec::new(
            Opts::new(
                "api_dependency_up",
                "Dependency health (1=healthy, 0=unhealthy)",
            ),
            &["dependency"],
        )?;
        registry.register(Box::new(dependency_up.clone()))?;

        let service_ready =
            IntGauge::new("api_service_ready", "Aggregate readiness of the service")?;
        registry.register(Box::new(service_ready.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            health_checks_total,
            probe_duration_seconds,
            dependency_up,
            service_ready,
        })
    }

    pub fn record_request(&self, method: &str, path: &str, status_code: u16, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, path, &status])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration.as_secs_f64());
    }

    pub fn record_probe(&self, dependency: &str, result: &ProbeResult) {
        self.health_checks_total
            .with_label_values(&[dependency, result.status.as_str()])
            .inc();

        if let Some(ms) = result.response_time_ms {
            self.probe_duration_seconds
                .with_label_values(&[dependency])
                .observe(ms as f64 / 1000.0);
        }

        let value = if result.is_healthy() { 1 } else { 0 };
        self.dependency_up
            .with_label_values(&[dependency])
            .set(value);
    }

    pub fn update_readiness(&self, ready: bool) {
        self.service_ready.set(if ready { 1 } else { 0 });
    }
}
