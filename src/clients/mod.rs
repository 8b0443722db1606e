// src/clients/mod.rs
mod cache;
mod database;

pub use cache::{CacheClient, RedisHandle};
pub use database::{connect_pool, DatabaseClient};

use crate::config::AppConfig;
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Holder for the service's external connections.
///
/// Constructed once at startup, handed by reference to whoever needs a
/// capability, torn down once at shutdown. No ambient globals.
pub struct Dependencies {
    db: PgPool,
    redis: Option<Arc<RedisHandle>>,
}

impl Dependencies {
    pub fn connect(config: &AppConfig) -> Result<Self> {
        let db = connect_pool(config)?;

        let redis = match config.redis_url() {
            Some(url) => Some(Arc::new(RedisHandle::connect(url)?)),
            None => None,
        };

        Ok(Self { db, redis })
    }

    pub fn db_client(&self) -> Arc<dyn DatabaseClient> {
        Arc::new(self.db.clone())
    }

    /// None when the cache is not configured for this deployment.
    pub fn cache_client(&self) -> Option<Arc<dyn CacheClient>> {
        self.redis
            .clone()
            .map(|handle| handle as Arc<dyn CacheClient>)
    }

    /// Close every connection. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.db.close().await;

        if let Some(redis) = &self.redis {
            redis.shutdown().await;
        }

        info!("Dependency connections closed");
    }
}
