// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension marker manifest parsing.
//!
//! A package opts into discovery by shipping `lib/quire_extension.toml`.
//! The file declares the extensions the package registers when activated:
//!
//! ```toml
//! [[extension]]
//! name = "blog"
//! version = "0.3.0"
//! requires = "~> 0.1"
//! description = "Blog articles, tags and feeds"
//!
//! [extension.settings]
//! blog_layout = "article"
//! ```

use std::any::Any;
use std::path::Path;

use quire_core::{Extension, QuireError, Settings};
use serde::Deserialize;

/// Parsed marker manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionManifest {
    pub extensions: Vec<DeclaredExtension>,
}

/// One extension declared in a marker manifest.
///
/// Registered as a ready value; activating it merges its default settings
/// into the application's settings and flags it as enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredExtension {
    pub name: String,
    pub version: semver::Version,
    /// Framework version constraint, checked at registration.
    pub requires: Option<String>,
    pub description: String,
    pub settings: Settings,
}

impl Extension for DeclaredExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        self.version.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn on_activate(&self, settings: &mut Settings) -> Result<(), QuireError> {
        for (key, value) in &self.settings {
            settings.entry(key.clone()).or_insert_with(|| value.clone());
        }
        settings.insert(self.name.clone(), serde_json::Value::Bool(true));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    extension: Vec<ExtensionSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtensionSection {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    requires: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    settings: Settings,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

/// Parse a marker manifest from TOML content.
///
/// `origin` names the source in error messages.
pub fn parse_extension_manifest(
    toml_content: &str,
    origin: &str,
) -> Result<ExtensionManifest, QuireError> {
    let invalid = |message: String| QuireError::Manifest {
        path: origin.to_string(),
        message,
    };

    let file: ManifestFile = toml::from_str(toml_content).map_err(|e| invalid(e.to_string()))?;

    let mut extensions = Vec::with_capacity(file.extension.len());
    for section in file.extension {
        if section.name.trim().is_empty() {
            return Err(invalid("extension name must not be empty".to_string()));
        }
        let version = semver::Version::parse(&section.version).map_err(|e| {
            invalid(format!(
                "extension `{}` has invalid version `{}`: {e}",
                section.name, section.version
            ))
        })?;
        extensions.push(DeclaredExtension {
            name: section.name,
            version,
            requires: section.requires,
            description: section.description,
            settings: section.settings,
        });
    }

    Ok(ExtensionManifest { extensions })
}

/// Read and parse a marker manifest from disk.
pub fn read_extension_manifest(path: &Path) -> Result<ExtensionManifest, QuireError> {
    let content = std::fs::read_to_string(path).map_err(|e| QuireError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_extension_manifest(&content, &path.display().to_string())
}
