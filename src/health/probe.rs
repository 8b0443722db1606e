// src/health/probe.rs
use async_trait::async_trait;
use tokio::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Healthy => "healthy",
            ProbeStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Outcome of a single dependency check.
///
/// `response_time_ms` is set whenever the probe actually performed I/O;
/// it is `None` only when the probe short-circuited because the
/// dependency is intentionally unconfigured.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl ProbeResult {
    pub fn healthy(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: ProbeStatus::Healthy,
            message: Some(message.into()),
            response_time_ms: Some(elapsed.as_millis() as u64),
        }
    }

    pub fn unhealthy(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: ProbeStatus::Unhealthy,
            message: Some(message.into()),
            response_time_ms: Some(elapsed.as_millis() as u64),
        }
    }

    /// Result for a dependency that is intentionally not configured.
    /// No I/O happened, so no response time is reported.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Healthy,
            message: Some(message.into()),
            response_time_ms: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ProbeStatus::Healthy
    }
}

/// Failure modes a probe can observe. These never escape a probe: each
/// one is converted into an `Unhealthy` result carrying its message.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Connection(String),

    #[error("{0} timeout")]
    Timeout(&'static str),

    #[error("{0} returned unexpected result")]
    UnexpectedResult(&'static str),
}

/// A unit of work that checks one dependency and reports a bounded-time
/// result. Implementations must not panic and must not return errors;
/// every failure mode is captured in the `ProbeResult` so that one
/// dependency can never abort its sibling check.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    async fn probe(&self) -> ProbeResult;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_results_carry_a_response_time() {
        let ok = ProbeResult::healthy("up", Duration::from_millis(12));
        assert_eq!(ok.response_time_ms, Some(12));
        assert!(ok.is_healthy());

        let err = ProbeResult::unhealthy("down", Duration::from_millis(0));
        assert_eq!(err.response_time_ms, Some(0));
        assert!(!err.is_healthy());
    }

    #[test]
    fn skipped_results_do_not() {
        let skipped = ProbeResult::skipped("not configured");
        assert!(skipped.is_healthy());
        assert_eq!(skipped.response_time_ms, None);
    }

    #[test]
    fn timeout_errors_mention_a_timeout() {
        let message = ProbeError::Timeout("Redis ping").to_string();
        assert!(message.contains("timeout"));
    }
}
