// src/clients/database.rs
use crate::config::AppConfig;
use crate::health::ProbeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// The narrow datastore capability the health subsystem consumes: run a
/// trivial validation query and report success or a descriptive error.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    async fn execute_trivial_query(&self) -> Result<(), ProbeError>;
}

#[async_trait]
impl DatabaseClient for PgPool {
    async fn execute_trivial_query(&self) -> Result<(), ProbeError> {
        sqlx::query("SELECT 1")
            .fetch_one(self)
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::Connection(e.to_string()))
    }
}

/// Build the shared connection pool. The pool connects lazily so that
/// the first real connectivity fault surfaces in the startup gate,
/// which owns the fatal path.
pub fn connect_pool(config: &AppConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.database_connect_timeout())
        .connect_lazy(&config.database_url)
        .context("Invalid DATABASE_URL")?;

    Ok(pool)
}
