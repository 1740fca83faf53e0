// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring between configuration, the extension registry and the server.

pub mod extensions;
pub mod serve;

use quire_config::QuireConfig;
use quire_plugin::{
    Bootstrap, Discoverer, DirectoryPackageLister, DiscoveryOptions, ExtensionRegistry,
    ManifestActivator,
};
use std::sync::Arc;

/// Crates whose events the `[log] level` setting controls.
const LOG_TARGETS: &[&str] = &[
    "quire",
    "quire_core",
    "quire_config",
    "quire_plugin",
    "quire_server",
];

/// Filter directive for `level`; everything else logs at `warn`.
pub fn log_filter(level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Install the global tracing subscriber. `RUST_LOG` overrides `level`.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Startup sequence described by `config`, over a new registry.
pub fn bootstrap_from_config(config: &QuireConfig) -> Bootstrap {
    let extensions = &config.extensions;
    let bootstrap = Bootstrap::new(Arc::new(ExtensionRegistry::new()))
        .with_builtins(extensions.builtin);
    if !extensions.auto_discover {
        return bootstrap;
    }
    let discoverer = Discoverer::new(
        DirectoryPackageLister::new(&extensions.search_paths),
        ManifestActivator,
    )
    .with_options(DiscoveryOptions {
        isolate_activation: extensions.isolate_activation,
        disabled: extensions.disabled.clone(),
    });
    bootstrap.with_discoverer(discoverer)
}
