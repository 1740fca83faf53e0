// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trait every registered extension value implements.

use std::any::Any;

use crate::error::QuireError;
use crate::types::Settings;

/// A named unit of functionality held by the extension registry.
///
/// Values are shared as `Arc<dyn Extension>` once registered or resolved, so
/// implementations must be thread-safe. Per-application state belongs in the
/// [`Settings`] passed to [`Extension::on_activate`], never in the extension.
pub trait Extension: Send + Sync + 'static {
    /// Returns the name the extension registers under.
    fn name(&self) -> &str;

    /// Returns the semantic version of this extension.
    fn version(&self) -> semver::Version;

    /// One-line human-readable summary.
    fn description(&self) -> &str {
        ""
    }

    /// Called when an application activates this extension.
    ///
    /// The default does nothing.
    fn on_activate(&self, _settings: &mut Settings) -> Result<(), QuireError> {
        Ok(())
    }

    /// Access to the concrete type for callers that know it.
    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("version", &self.version().to_string())
            .finish()
    }
}
