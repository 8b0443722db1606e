// src/clients/cache.rs
use crate::health::ProbeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The narrow cache capability the health subsystem consumes: send a
/// PING and hand back the server's reply, plus an idempotent teardown.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn ping(&self) -> Result<String, ProbeError>;

    async fn disconnect(&self);
}

enum ConnectionState {
    Idle,
    Connected(MultiplexedConnection),
    Closed,
}

/// Shared Redis handle with connect-once-reuse semantics.
///
/// Construction only parses the URL; the multiplexed connection is
/// established on the first ping and reused for every probe after
/// that. `shutdown` is terminal: once closed, later pings fail fast
/// instead of reconnecting.
pub struct RedisHandle {
    client: redis::Client,
    state: Mutex<ConnectionState>,
}

impl RedisHandle {
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("Invalid REDIS_URL")?;

        Ok(Self {
            client,
            state: Mutex::new(ConnectionState::Idle),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, ProbeError> {
        let mut state = self.state.lock().await;

        match &*state {
            ConnectionState::Connected(conn) => Ok(conn.clone()),
            ConnectionState::Closed => Err(ProbeError::Connection(
                "Redis client has been shut down".to_string(),
            )),
            ConnectionState::Idle => {
                debug!("Establishing Redis connection");
                let conn = self
                    .client
                    .get_multiplexed_tokio_connection()
                    .await
                    .map_err(|e| ProbeError::Connection(e.to_string()))?;

                *state = ConnectionState::Connected(conn.clone());
                Ok(conn)
            }
        }
    }

    /// Tear the handle down. The first call closes any live connection
    /// and returns true; every later call is a no-op returning false.
    pub async fn shutdown(&self) -> bool {
        let mut state = self.state.lock().await;

        match std::mem::replace(&mut *state, ConnectionState::Closed) {
            ConnectionState::Closed => false,
            ConnectionState::Idle => true,
            ConnectionState::Connected(conn) => {
                drop(conn);
                info!("Redis connection closed");
                true
            }
        }
    }
}

#[async_trait]
impl CacheClient for RedisHandle {
    async fn ping(&self) -> Result<String, ProbeError> {
        let mut conn = self.connection().await?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))
    }

    async fn disconnect(&self) {
        self.shutdown().await;
    }
}
