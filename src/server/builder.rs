// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use anyhow::Result;
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::Service;

/// Builder pattern so each binary can inject its own handler.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind, then accept until the shutdown future resolves. Each
    /// connection gets its own Tokio task; in-flight requests finish on
    /// their own tasks after the listener stops.
    pub async fn serve_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let handler = self.handler.expect("handler must be set via with_handler()");

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("HTTP server listening on {}", self.addr);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    let svc = handler.clone();

                    tokio::spawn(async move {
                        if let Err(err) = Http::new().serve_connection(stream, svc).await {
                            tracing::warn!(%peer, %err, "connection error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, closing listener");
                    break;
                }
            }
        }

        Ok(())
    }
}
