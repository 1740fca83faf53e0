// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in extension catalog.
//!
//! The extensions shipped with Quire itself. They are registered as
//! factories so none of them is built until an application asks for it.

use std::any::Any;
use std::sync::Arc;

use quire_core::{framework_version, Extension, QuireError, Settings};
use tracing::debug;

use crate::registry::{ExtensionRegistry, Provider, Registration};

/// A built-in extension. Activating it switches on its settings flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinExtension {
    pub name: &'static str,
    pub description: &'static str,
}

impl Extension for BuiltinExtension {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> semver::Version {
        framework_version()
    }

    fn description(&self) -> &str {
        self.description
    }

    fn on_activate(&self, settings: &mut Settings) -> Result<(), QuireError> {
        settings.insert(self.name.to_string(), serde_json::Value::Bool(true));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Returns all built-in extensions.
pub fn builtin_catalog() -> Vec<BuiltinExtension> {
    vec![
        BuiltinExtension {
            name: "relative_assets",
            description: "Rewrite asset paths relative to the current page",
        },
        BuiltinExtension {
            name: "asset_host",
            description: "Serve assets from one or more separate hosts",
        },
        BuiltinExtension {
            name: "asset_hash",
            description: "Append a content hash to asset file names",
        },
        BuiltinExtension {
            name: "cache_buster",
            description: "Add a cache-busting query string to asset URLs",
        },
        BuiltinExtension {
            name: "automatic_image_sizes",
            description: "Fill in width and height attributes of images",
        },
        BuiltinExtension {
            name: "minify_css",
            description: "Minify CSS output",
        },
        BuiltinExtension {
            name: "minify_javascript",
            description: "Minify JavaScript output",
        },
        BuiltinExtension {
            name: "lorem",
            description: "Placeholder text, names and images for prototyping",
        },
        BuiltinExtension {
            name: "directory_indexes",
            description: "Build `page.html` as `page/index.html`",
        },
    ]
}

/// Built-ins whose name or description mentions every word of `query`.
///
/// Matching ignores case, and `-` in the query matches `_` in names, so
/// `minify-css` finds `minify_css`. A blank query matches everything.
pub fn search_catalog(query: &str) -> Vec<BuiltinExtension> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    builtin_catalog()
        .into_iter()
        .filter(|builtin| {
            let haystack = format!("{} {}", builtin.name, builtin.description).to_lowercase();
            terms.iter().all(|term| {
                haystack.contains(term.as_str()) || haystack.contains(&term.replace('-', "_"))
            })
        })
        .collect()
}

/// Register every built-in extension as a deferred entry.
///
/// Returns how many names were newly registered.
pub fn register_builtins(registry: &ExtensionRegistry) -> Result<usize, QuireError> {
    let mut registered = 0;
    for builtin in builtin_catalog() {
        let name = builtin.name;
        let provider = Provider::factory(move || Ok(Arc::new(builtin.clone()) as Arc<dyn Extension>));
        if registry.register(name, provider, None)? == Registration::Registered {
            registered += 1;
        }
    }
    debug!(registered, "built-in extensions registered");
    Ok(registered)
}
