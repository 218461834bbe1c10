//! Hyper server setup and request handling.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::{Request, Response};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::router::Router;

/// HTTP server for the student records API.
pub struct Server {
    addr: SocketAddr,
    router: Arc<Router>,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to
    /// * `router` - Request router
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        let shutdown_timeout =
            Duration::from_millis(router.state().config.shutdown_timeout_ms);
        Self {
            addr,
            router: Arc::new(router),
            shutdown_timeout,
        }
    }

    /// Starts the HTTP server and stops accepting connections once `signal`
    /// resolves.
    ///
    /// In-flight connections are given the configured shutdown timeout to
    /// finish before the server returns and the router (with its connection
    /// pool) is dropped.
    ///
    /// # Returns
    /// `Result<(), std::io::Error>` indicating whether the listener could be bound.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "Server listening");

        let builder = ConnectionBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            tracing::warn!(error = %err, "Failed to accept connection");
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let router = Arc::clone(&self.router);
                    let service = hyper::service::service_fn(move |req| {
                        handle_request(req, router.clone())
                    });

                    let conn = builder.serve_connection_with_upgrades(io, service);
                    let conn = graceful.watch(conn.into_owned());
                    tokio::task::spawn(async move {
                        if let Err(err) = conn.await {
                            tracing::debug!(%peer, error = %err, "Error serving connection");
                        }
                    });
                }
                _ = &mut signal => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        tokio::select! {
            _ = graceful.shutdown() => {
                tracing::info!("All connections closed");
            }
            _ = tokio::time::sleep(self.shutdown_timeout) => {
                tracing::warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "Timed out waiting for connections to close"
                );
            }
        }

        Ok(())
    }
}

/// Handles an incoming HTTP request.
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(router.handle(req).await.map(Full::new))
}
