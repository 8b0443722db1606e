// src/health/database.rs
use crate::clients::DatabaseClient;
use crate::health::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::error;

const HEALTHY_MESSAGE: &str = "Database connection is healthy";
const FALLBACK_MESSAGE: &str = "Database connection failed";

/// Checks the relational datastore by running a trivial query through
/// the injected client. Elapsed time is measured on both arms: time
/// spent before a failure is still worth reporting.
pub struct DatabaseProbe {
    client: Arc<dyn DatabaseClient>,
}

impl DatabaseProbe {
    pub fn new(client: Arc<dyn DatabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DependencyProbe for DatabaseProbe {
    async fn probe(&self) -> ProbeResult {
        let start = Instant::now();

        match self.client.execute_trivial_query().await {
            Ok(()) => ProbeResult::healthy(HEALTHY_MESSAGE, start.elapsed()),
            Err(e) => {
                error!("Database health check failed: {}", e);

                let mut message = e.to_string();
                if message.is_empty() {
                    message = FALLBACK_MESSAGE.to_string();
                }

                ProbeResult::unhealthy(message, start.elapsed())
            }
        }
    }

    fn name(&self) -> &'static str {
        "database"
    }
}
