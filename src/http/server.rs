//! Worker instances and connection serving.
//!
//! # Responsibilities
//! - Build one Axum router per worker instance
//! - Run N independent accept loops against a single shared listener
//! - Serve each accepted connection on the owning worker's router
//! - Wire up middleware (tracing, response compression)
//! - Graceful shutdown on Ctrl+C
//!
//! # Design Decisions
//! - Workers share the accept queue, nothing else: each owns its router and
//!   content pool, so requests never touch cross-worker state
//! - A connection that closes mid-delay just drops the handler future; no
//!   error is reported

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::handlers::{self, WorkerState};

/// Errors that prevent the server from running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("listener error")]
    Listener(#[source] std::io::Error),
}

/// The stub server: a fixed pool of worker instances sharing one listener.
pub struct StubServer {
    config: ServerConfig,
}

impl StubServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind the configured address and run until shutdown.
    pub async fn bind_and_run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.run(listener).await
    }

    /// Run worker accept loops on an already-bound listener until shutdown.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ServerError::Listener)?;
        let listener = Arc::new(listener);

        for (method, path) in [("GET", "/health"), ("POST", "/ping"), ("GET|POST", "/data")] {
            tracing::info!(method, path, "Registered endpoint");
        }
        tracing::info!(
            address = %addr,
            workers = self.config.workers,
            "Listening for connections"
        );

        for worker in 0..self.config.workers {
            let listener = listener.clone();
            let router = Self::build_router(worker);
            tokio::spawn(worker_loop(worker, listener, router));
        }

        shutdown_signal().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Build one worker's router. Each worker gets its own content pool.
    fn build_router(worker: usize) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/ping", post(handlers::ping))
            .route("/data", get(handlers::data).post(handlers::data))
            .with_state(WorkerState::new(worker))
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
    }
}

/// One worker instance: accept from the shared queue, serve each connection
/// on this worker's router.
async fn worker_loop(worker: usize, listener: Arc<TcpListener>, router: Router) {
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                // Transient under load (ECONNABORTED, EMFILE); the worker
                // backs off briefly and keeps accepting.
                tracing::warn!(worker, error = %err, "Accept failed");
                tokio::time::sleep(Duration::from_millis(10)).await;
                continue;
            }
        };
        tracing::debug!(worker, peer_addr = %peer_addr, "Connection accepted");

        let service = TowerToHyperService::new(
            router
                .clone()
                .map_request(|req: Request<Incoming>| req.map(Body::new)),
        );
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                // Covers clients that disconnect mid-response or mid-delay.
                tracing::debug!(error = %err, "Connection ended with error");
            }
        });
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
