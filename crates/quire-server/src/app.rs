// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sandboxed applications.
//!
//! Every [`App`] owns its settings and its list of activated extensions.
//! Two apps built from the same registry share the registered extensions
//! but nothing an activation writes.

use std::sync::Arc;

use quire_core::{Extension, QuireError, Settings};
use quire_plugin::{ExtensionRegistry, Lookup};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct App {
    registry: Arc<ExtensionRegistry>,
    settings: Settings,
    activated: Vec<Arc<dyn Extension>>,
}

impl App {
    /// A fresh application with empty settings over `registry`.
    pub fn sandboxed(registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            registry,
            settings: Settings::new(),
            activated: Vec::new(),
        }
    }

    /// Load `name` from the registry and activate it on this app.
    ///
    /// Activating the same extension twice is a no-op. `NotFound` and
    /// `Unavailable` are returned unchanged and leave the app untouched.
    pub fn activate(&mut self, name: &str) -> Result<Lookup, QuireError> {
        let lookup = self.registry.load(name)?;
        let Lookup::Found(extension) = &lookup else {
            debug!(extension = name, ?lookup, "extension not activated");
            return Ok(lookup);
        };

        if self.is_activated(name) {
            debug!(extension = name, "extension already active");
            return Ok(lookup);
        }

        extension.on_activate(&mut self.settings)?;
        self.activated.push(Arc::clone(extension));
        info!(extension = name, version = %extension.version(), "extension activated");
        Ok(lookup)
    }

    pub fn is_activated(&self, name: &str) -> bool {
        self.activated.iter().any(|e| e.name() == name)
    }

    /// Names of activated extensions, in activation order.
    pub fn activated(&self) -> Vec<String> {
        self.activated.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set one application setting.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.settings.insert(key.into(), value);
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }
}
