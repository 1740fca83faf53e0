// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Quire.
//!
//! `quire.toml` is read from the system, user and working directories, then
//! overridden by `QUIRE_*` environment variables. Unknown keys are rejected
//! with a miette diagnostic that suggests the closest valid key.
//!
//! ```no_run
//! let config = quire_config::load_and_validate().expect("config errors");
//! println!("serving on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ExtensionsConfig, LogConfig, QuireConfig, ServerConfig};

/// Load every configuration layer and validate the result.
pub fn load_and_validate() -> Result<QuireConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => validated(config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string over the defaults and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<QuireConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validated(config),
        Err(err) => {
            let sources = [("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn validated(config: QuireConfig) -> Result<QuireConfig, Vec<ConfigError>> {
    validation::validate_config(&config)?;
    tracing::debug!(
        host = %config.server.host,
        port = config.server.port,
        "configuration loaded"
    );
    Ok(config)
}

/// Contents of the config files that exist, keyed by the path Figment reports.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG.into());

    [Some(local), loader::user_config_path(), Some(loader::SYSTEM_CONFIG.into())]
        .into_iter()
        .flatten()
        .filter_map(|path: std::path::PathBuf| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
