// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `quire serve`: bootstrap the registry and run the preview server until
//! SIGINT or SIGTERM.

use quire_config::QuireConfig;
use quire_core::QuireError;
use quire_plugin::Lookup;
use quire_server::{start_server, App, ServerHandle, ServerOptions};
use tracing::{info, warn};

use crate::bootstrap_from_config;

/// Command-line overrides for `[server]`.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub logging: bool,
    /// Extensions to activate on the served app.
    pub activate: Vec<String>,
}

/// Bootstrap, activate the requested extensions and start serving.
pub async fn start(
    config: &QuireConfig,
    overrides: ServeOverrides,
) -> Result<ServerHandle, QuireError> {
    let bootstrap = bootstrap_from_config(config);
    let report = bootstrap.run()?;
    for skipped in &report.skipped {
        warn!(package = %skipped.name, reason = %skipped.reason, "package skipped");
    }

    let registry = bootstrap.registry().clone();
    let mut app = App::sandboxed(registry.clone());
    for name in &overrides.activate {
        match app.activate(name)? {
            Lookup::Found(_) => {}
            Lookup::NotFound => {
                return Err(QuireError::Config(format!("unknown extension `{name}`")));
            }
            Lookup::Unavailable { message } => return Err(QuireError::Config(message)),
        }
    }

    let options = ServerOptions {
        host: overrides.host.unwrap_or_else(|| config.server.host.clone()),
        port: overrides.port.unwrap_or(config.server.port),
        logging: overrides.logging || config.server.logging,
        app: Some(app),
    };
    start_server(registry, options).await
}

/// Run `quire serve` until a shutdown signal arrives.
pub async fn run_serve(config: QuireConfig, overrides: ServeOverrides) -> Result<(), QuireError> {
    let handle = start(&config, overrides).await?;
    info!(addr = %handle.local_addr(), "quire serve ready");

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    handle.wait().await?;
    info!("quire serve shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}
