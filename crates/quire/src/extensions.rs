// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `quire extensions list`, `discover` and `search`.

use std::fmt::Write as _;

use quire_config::QuireConfig;
use quire_core::QuireError;
use quire_plugin::{search_catalog, DiscoveryReport, EntryStatus};

use crate::bootstrap_from_config;

/// Render registry statuses as aligned `name  state  message` rows.
pub fn format_statuses(statuses: &[EntryStatus]) -> String {
    let width = statuses.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for status in statuses {
        let _ = write!(out, "{:width$}  {:<8}", status.name, status.state.to_string());
        if let Some(message) = &status.message {
            let _ = write!(out, "  {message}");
        }
        out.push('\n');
    }
    out
}

pub fn format_report(report: &DiscoveryReport) -> String {
    let mut out = format!(
        "scanned {} package(s), activated {}\n",
        report.scanned.len(),
        report.activated.len()
    );
    for name in &report.activated {
        let _ = writeln!(out, "  activated  {name}");
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "  skipped    {} ({})", skipped.name, skipped.reason);
    }
    out
}

/// Bootstrap as `quire serve` would and list every registered extension.
pub fn list(config: &QuireConfig, json: bool) -> Result<String, QuireError> {
    let bootstrap = bootstrap_from_config(config);
    bootstrap.run()?;
    let statuses = bootstrap.registry().statuses();
    if json {
        serde_json::to_string_pretty(&statuses)
            .map_err(|e| QuireError::Internal(format!("failed to encode statuses: {e}")))
    } else {
        Ok(format_statuses(&statuses))
    }
}

/// Built-in extensions matching `query`, one `name  description` row each.
pub fn search(query: &str) -> String {
    let found = search_catalog(query);
    if found.is_empty() {
        return format!("no built-in extension matches `{}`\n", query.trim());
    }
    let width = found.iter().map(|b| b.name.len()).max().unwrap_or(0);
    found
        .iter()
        .map(|b| format!("{:width$}  {}\n", b.name, b.description))
        .collect()
}

/// Run discovery alone, without built-ins, and summarize it.
pub fn discover(config: &QuireConfig) -> Result<String, QuireError> {
    let mut config = config.clone();
    config.extensions.builtin = false;
    config.extensions.auto_discover = true;
    let bootstrap = bootstrap_from_config(&config);
    Ok(format_report(bootstrap.run()?))
}
