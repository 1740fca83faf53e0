// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Quire framework.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Quire configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuireConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Preview server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Extension registration and discovery settings.
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Preview server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log every request.
    #[serde(default)]
    pub logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4567
}

/// Extension registration and discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionsConfig {
    /// Scan installed packages for extensions at startup.
    #[serde(default = "default_true")]
    pub auto_discover: bool,

    /// Register the built-in extension catalog.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Directories holding installed packages as `<name>-<version>/`.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,

    /// Skip packages that fail to activate instead of aborting startup.
    #[serde(default)]
    pub isolate_activation: bool,

    /// Package names never activated by discovery.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            auto_discover: true,
            builtin: true,
            search_paths: default_search_paths(),
            isolate_activation: false,
            disabled: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_search_paths() -> Vec<String> {
    dirs::data_dir()
        .map(|p| p.join("quire").join("packages"))
        .into_iter()
        .map(|p| p.display().to_string())
        .collect()
}
