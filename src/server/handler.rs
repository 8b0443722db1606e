// src/server/handler.rs
use crate::config::AppConfig;
use crate::health::HealthAggregator;
use crate::metrics::MetricsRegistry;
use crate::server::correlation::{CorrelationId, CORRELATION_HEADER};
use crate::server::responses;
use hyper::header::HeaderValue;
use hyper::{header, Body, Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tower::Service;
use tracing::{info, info_span, Instrument};

struct HandlerInner {
    aggregator: Arc<HealthAggregator>,
    metrics: Option<Arc<MetricsRegistry>>,
    metrics_path: String,
    started_at: Instant,
}

/// Routes the health endpoints. Cloned per connection; all state lives
/// behind one Arc.
#[derive(Clone)]
pub struct ApiHandler {
    inner: Arc<HandlerInner>,
}

impl ApiHandler {
    pub fn new(
        aggregator: Arc<HealthAggregator>,
        metrics: Option<Arc<MetricsRegistry>>,
        config: &AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(HandlerInner {
                aggregator,
                metrics,
                metrics_path: config.metrics_path.clone(),
                started_at: Instant::now(),
            }),
        }
    }

    async fn route(inner: &HandlerInner, req: Request<Body>) -> Response<Body> {
        match (req.method(), req.uri().path()) {
            (&Method::GET, "/health") => responses::health(inner.started_at),
            (&Method::GET, "/health/ready") => {
                let report = inner.aggregator.check_overall_health().await;
                responses::readiness(&report)
            }
            (&Method::GET, "/health/live") => responses::liveness(inner.started_at),
            (&Method::GET, path) if path == inner.metrics_path => match &inner.metrics {
                Some(registry) => Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                    .body(Body::from(registry.gather()))
                    .unwrap(),
                None => responses::not_found(),
            },
            _ => responses::not_found(),
        }
    }
}

impl Service<Request<Body>> for ApiHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let correlation_id = CorrelationId::from_request(&req);
            let span = info_span!("request", correlation_id = %correlation_id);

            async move {
                let started = Instant::now();
                let method = req.method().clone();
                let path = req.uri().path().to_string();

                let mut response = Self::route(&inner, req).await;

                if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
                    response
                        .headers_mut()
                        .insert(CORRELATION_HEADER, value);
                }

                if let Some(registry) = &inner.metrics {
                    registry.collector().record_request(
                        method.as_str(),
                        &path,
                        response.status().as_u16(),
                        started.elapsed(),
                    );
                }

                info!(
                    status = response.status().as_u16(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    "{} {}",
                    method,
                    path
                );

                Ok(response)
            }
            .instrument(span)
            .await
        })
    }
}
