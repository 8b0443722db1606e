// src/server/responses.rs
// Boundary rendering: report structs in, HTTP status + JSON body out.
use crate::config::{APP_NAME, APP_VERSION};
use crate::health::{OverallHealth, ProbeResult};
use chrono::Utc;
use hyper::{header, Body, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time: Option<String>,
}

impl From<&ProbeResult> for DependencyBody {
    fn from(result: &ProbeResult) -> Self {
        Self {
            status: result.status.as_str(),
            message: result.message.clone(),
            response_time: result.response_time_ms.map(format_millis),
        }
    }
}

/// Body served by `GET /health/ready`, with the same shape for 200 and
/// 503 so pollers can always parse it.
#[derive(Serialize)]
pub struct ReadinessBody {
    status: &'static str,
    timestamp: String,
    database: DependencyBody,
    redis: DependencyBody,
}

impl From<&OverallHealth> for ReadinessBody {
    fn from(report: &OverallHealth) -> Self {
        Self {
            status: report.status.as_str(),
            timestamp: report.timestamp.to_rfc3339(),
            database: DependencyBody::from(&report.database),
            redis: DependencyBody::from(&report.redis),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthBody {
    status: &'static str,
    timestamp: String,
    app: &'static str,
    version: &'static str,
    uptime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_bytes: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessBody {
    status: &'static str,
    uptime: u64,
    uptime_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<MemoryBody>,
    timestamp: String,
}

#[derive(Serialize)]
struct MemoryBody {
    rss: String,
}

pub fn readiness(report: &OverallHealth) -> Response<Body> {
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json(status, &ReadinessBody::from(report))
}

pub fn health(started_at: Instant) -> Response<Body> {
    json(
        StatusCode::OK,
        &HealthBody {
            status: "ok",
            timestamp: Utc::now().to_rfc3339(),
            app: APP_NAME,
            version: APP_VERSION,
            uptime: started_at.elapsed().as_secs(),
            memory_bytes: resident_memory_bytes(),
        },
    )
}

pub fn liveness(started_at: Instant) -> Response<Body> {
    let uptime = started_at.elapsed().as_secs();

    json(
        StatusCode::OK,
        &LivenessBody {
            status: "alive",
            uptime,
            uptime_formatted: format_uptime(uptime),
            memory: resident_memory_bytes().map(|bytes| MemoryBody {
                rss: format!("{}MB", bytes / (1024 * 1024)),
            }),
            timestamp: Utc::now().to_rfc3339(),
        },
    )
}

pub fn not_found() -> Response<Body> {
    json(StatusCode::NOT_FOUND, &json!({ "error": "Not Found" }))
}

pub fn json(status: StatusCode, body: &impl Serialize) -> Response<Body> {
    let payload = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}

pub fn format_millis(ms: u64) -> String {
    format!("{}ms", ms)
}

/// "1d 2h 3m 4s", dropping leading units that are zero.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, secs)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Resident set size in bytes, from /proc on Linux. None elsewhere.
fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;

    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;

    Some(kb * 1024)
}
