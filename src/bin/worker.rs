// src/bin/worker.rs
// Background-job runner. Same health surface as the API binary, but the
// cache is a hard dependency: without Redis there is no job queue.
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use workforce_api::{
    clients::Dependencies,
    config,
    health::{run_startup_checks, CachePolicy, DatabaseProbe, HealthAggregator, RedisProbe},
    metrics::MetricsRegistry,
    server::{ApiHandler, ServerBuilder},
    worker,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workforce_api=debug".parse()?)
                .add_directive("worker=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let config = config::load_config()?;
    info!("Starting worker service in {:?} mode", config.environment);

    let deps = Dependencies::connect(&config)?;

    let database_probe = Arc::new(DatabaseProbe::new(deps.db_client()));
    let redis_probe = Arc::new(RedisProbe::new(deps.cache_client()));

    if let Err(e) = run_startup_checks(
        database_probe.as_ref(),
        redis_probe.as_ref(),
        CachePolicy::Required,
    )
    .await
    {
        error!("Startup health check failed: {}", e);
        deps.shutdown().await;
        return Err(e);
    }

    let processors = worker::default_processors();
    for processor in &processors {
        info!("Registered job processor for queue '{}'", processor.queue());
    }
    // TODO: attach the processors to queue consumers once the
    // scheduling API starts publishing jobs.

    let metrics = if config.metrics_enabled {
        Some(Arc::new(MetricsRegistry::new()?))
    } else {
        None
    };

    let mut aggregator = HealthAggregator::new(database_probe, redis_probe);
    if let Some(registry) = &metrics {
        aggregator = aggregator.with_metrics(registry.collector());
    }

    let handler = ApiHandler::new(Arc::new(aggregator), metrics, &config);

    let addr = config.bind_addr();
    info!("Starting worker health server on {}", addr);

    ServerBuilder::new(addr)
        .with_handler(handler)
        .serve_until(shutdown_signal())
        .await?;

    deps.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
