// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process startup for the extension subsystem.
//!
//! `Bootstrap` owns the shared registry, registers the built-in catalog and
//! runs discovery once. The registry is handed to the rest of the
//! application only after [`Bootstrap::run`] returns.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use quire_core::QuireError;
use tracing::info;

use crate::catalog::register_builtins;
use crate::discovery::{Discoverer, DiscoveryReport};
use crate::registry::ExtensionRegistry;

pub struct Bootstrap {
    registry: Arc<ExtensionRegistry>,
    builtins: bool,
    discoverer: Option<Discoverer>,
    report: OnceCell<DiscoveryReport>,
}

impl Bootstrap {
    /// Bootstrap around an existing registry, with no built-ins and no discovery.
    pub fn new(registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            registry,
            builtins: false,
            discoverer: None,
            report: OnceCell::new(),
        }
    }

    /// Register the built-in catalog before discovery runs.
    pub fn with_builtins(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// Discover installed extension packages with `discoverer`.
    pub fn with_discoverer(mut self, discoverer: Discoverer) -> Self {
        self.discoverer = Some(discoverer);
        self
    }

    /// Run startup once.
    ///
    /// Later calls return the report of the first successful run without
    /// scanning again. If the first run fails, the next call retries.
    pub fn run(&self) -> Result<&DiscoveryReport, QuireError> {
        self.report.get_or_try_init(|| {
            if self.builtins {
                register_builtins(&self.registry)?;
            }
            let report = match &self.discoverer {
                Some(discoverer) => discoverer.discover_and_activate(&self.registry)?,
                None => DiscoveryReport::default(),
            };
            info!(
                extensions = self.registry.len(),
                packages = report.activated.len(),
                "extension registry ready"
            );
            Ok(report)
        })
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("registry", &self.registry)
            .field("builtins", &self.builtins)
            .field("discoverer", &self.discoverer)
            .field("ran", &self.report.get().is_some())
            .finish()
    }
}
