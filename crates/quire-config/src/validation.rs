// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every problem is collected so a broken `quire.toml` is reported in one pass.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::QuireConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &QuireConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |key: &str, message: String| {
        errors.push(ConfigError::Validation {
            key: key.to_string(),
            message,
        })
    };

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        invalid(
            "log.level",
            format!(
                "`{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        invalid("server.host", "must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        invalid(
            "server.host",
            format!("`{host}` is not a valid IP address or hostname"),
        );
    }

    if config.server.port == 0 {
        invalid("server.port", "must be between 1 and 65535".to_string());
    }

    for (i, path) in config.extensions.search_paths.iter().enumerate() {
        if path.trim().is_empty() {
            invalid(
                &format!("extensions.search_paths[{i}]"),
                "must not be empty".to_string(),
            );
        }
    }

    let mut seen = HashSet::new();
    for (i, name) in config.extensions.disabled.iter().enumerate() {
        if name.trim().is_empty() {
            invalid(
                &format!("extensions.disabled[{i}]"),
                "must not be empty".to_string(),
            );
        } else if !seen.insert(name.as_str()) {
            invalid(
                "extensions.disabled",
                format!("package `{name}` is listed twice"),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
