// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stub extensions and instrumented factories.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quire_core::{Extension, QuireError, Settings};
use quire_plugin::Provider;

/// Minimal extension that records a settings flag under its name on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubExtension {
    pub name: String,
    pub version: semver::Version,
}

impl StubExtension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: semver::Version::new(0, 1, 0),
        }
    }

    pub fn shared(name: impl Into<String>) -> Arc<dyn Extension> {
        Arc::new(Self::new(name))
    }
}

impl Extension for StubExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        self.version.clone()
    }

    fn description(&self) -> &str {
        "stub extension for tests"
    }

    fn on_activate(&self, settings: &mut Settings) -> Result<(), QuireError> {
        settings.insert(self.name.clone(), true.into());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A factory provider building a [`StubExtension`] named `name`, and the
/// counter of how many times it ran.
pub fn counting_factory(name: &str) -> (Provider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let name = name.to_string();
    let provider = Provider::factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(extension = %name, "counting factory invoked");
        Ok(StubExtension::shared(name.clone()))
    });
    (provider, calls)
}

/// A factory provider that fails its first `failures` invocations.
pub fn failing_factory(name: &str, failures: usize) -> (Provider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let name = name.to_string();
    let provider = Provider::factory(move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        if call < failures {
            Err(QuireError::Internal(format!("{name} not ready (attempt {})", call + 1)))
        } else {
            Ok(StubExtension::shared(name.clone()))
        }
    });
    (provider, calls)
}
