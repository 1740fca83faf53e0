// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preview server built on axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use quire_core::QuireError;
use quire_plugin::ExtensionRegistry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::App;
use crate::handlers;

pub const DEFAULT_PORT: u16 = 4567;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Options for [`start_server`].
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub port: u16,
    pub host: String,
    /// Log every request through `TraceLayer`.
    pub logging: bool,
    /// Serve this app instead of a fresh sandboxed one.
    pub app: Option<App>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            logging: false,
            app: None,
        }
    }
}

/// Build the router serving `app`.
pub fn router(app: Arc<App>, logging: bool) -> Router {
    let router = Router::new()
        .route("/__quire/health", get(handlers::get_health))
        .route("/__quire/extensions", get(handlers::get_extensions))
        .with_state(app);

    if logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// A running server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl ServerHandle {
    /// The bound address; differs from the requested one when port 0 was asked for.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token that stops the server when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> Result<(), QuireError> {
        self.cancel.cancel();
        self.wait().await
    }

    /// Wait until the server stops.
    pub async fn wait(self) -> Result<(), QuireError> {
        let served = self.task.await.map_err(|e| QuireError::Server {
            message: format!("server task failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        served.map_err(|e| QuireError::Server {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;
        info!(addr = %self.local_addr, "server stopped");
        Ok(())
    }
}

/// Bind `options.host:options.port` and serve in the background.
///
/// Without an explicit `options.app`, a fresh sandboxed app over
/// `registry` is served.
pub async fn start_server(
    registry: Arc<ExtensionRegistry>,
    options: ServerOptions,
) -> Result<ServerHandle, QuireError> {
    let app = options
        .app
        .unwrap_or_else(|| App::sandboxed(registry));
    let router = router(Arc::new(app), options.logging);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QuireError::Server {
            message: format!("failed to bind server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;
    let local_addr = listener.local_addr().map_err(|e| QuireError::Server {
        message: format!("failed to read bound address: {e}"),
        source: Some(Box::new(e)),
    })?;

    info!(addr = %local_addr, logging = options.logging, "server listening");

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    let task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
    });

    Ok(ServerHandle {
        local_addr,
        cancel,
        task,
    })
}
