// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Later layers override earlier ones:
//! 1. Compiled defaults
//! 2. `/etc/quire/quire.toml`
//! 3. `~/.config/quire/quire.toml`
//! 4. `./quire.toml`
//! 5. `QUIRE_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QuireConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/quire/quire.toml";

/// Project-local configuration file, relative to the working directory.
pub const LOCAL_CONFIG: &str = "quire.toml";

/// Per-user configuration file, if a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quire").join("quire.toml"))
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG)).merge(env_provider())
}

/// Load configuration from every layer.
pub fn load_config() -> Result<QuireConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QuireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file, with environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `QUIRE_*` environment variables mapped onto config sections.
///
/// Only the first underscore after a section name becomes a dot, so
/// `QUIRE_EXTENSIONS_ISOLATE_ACTIVATION` maps to
/// `extensions.isolate_activation`.
fn env_provider() -> Env {
    Env::prefixed("QUIRE_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["log", "server", "extensions"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QUIRE_SERVER_PORT", "9000");
            jail.set_env("QUIRE_EXTENSIONS_ISOLATE_ACTIVATION", "true");
            jail.set_env("QUIRE_LOG_LEVEL", "debug");
            let config = load_config()?;
            assert_eq!(config.server.port, 9000);
            assert!(config.extensions.isolate_activation);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "quire.toml",
                "[server]\nhost = \"127.0.0.1\"\n\n[extensions]\ndisabled = [\"noisy\"]\n",
            )?;
            let config = load_config()?;
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 4567);
            assert_eq!(config.extensions.disabled, vec!["noisy"]);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("site.toml", "[server]\nlogging = true\n")?;
            let config = load_config_from_path(Path::new("site.toml"))?;
            assert!(config.server.logging);
            Ok(())
        });
    }
}
