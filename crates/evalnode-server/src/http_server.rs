//! HTTP Server for the evalnode worker
//!
//! This module provides the accept loop, built on hyper's HTTP/1.1 server.
//!
//! # Architecture
//!
//! The HTTP server:
//! - Listens on a TCP socket for incoming HTTP connections
//! - Spawns a tokio task for each connection, so a slow invocation never holds
//!   up the accept loop
//! - Reads each request body in full and hands the request to the
//!   [`RouteTable`]
//!
//! There is no limit on connections here; invocations are admission-gated by
//! the executor instead.
//!
//! # Example
//!
//! ```no_run
//! use evalnode_server::http_server::HttpServer;
//! use evalnode_server::http_router::RouteTable;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = HttpServer::new(RouteTable::builder().build());
//!     server.run("127.0.0.1:8080".parse().unwrap()).await.unwrap();
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use evalnode_common::{EvalnodeError, Result};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::http_router::{error_response, HyperResponse, RouteTable};

/// HTTP server for an evalnode worker.
pub struct HttpServer {
    routes: Arc<RouteTable>,
}

impl HttpServer {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }

    /// Binds `addr` and serves until the process ends.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EvalnodeError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        tracing::info!(
            "HTTP server listening on {}",
            listener.local_addr().map_err(|e| EvalnodeError::Transport(format!(
                "Failed to get local address: {}",
                e
            )))?
        );

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let routes = self.routes.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let routes = routes.clone();
                    async move { Self::handle_request(routes, req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::debug!("Error serving connection from {}: {}", peer, err);
                }
            });
        }
    }

    async fn handle_request(
        routes: Arc<RouteTable>,
        req: Request<Incoming>,
    ) -> std::result::Result<HyperResponse, Infallible> {
        let (parts, body) = req.into_parts();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let error = EvalnodeError::Transport(format!("Failed to read request body: {}", e));
                tracing::error!("{}", error);
                return Ok(error_response(&error));
            }
        };

        Ok(routes.dispatch(Request::from_parts(parts, body)).await)
    }
}
