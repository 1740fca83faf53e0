// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Quire framework.

use thiserror::Error;

use crate::version::ConstraintParseError;

/// The primary error type used across the registry, discovery and server crates.
///
/// Version incompatibility and unknown extension names are deliberately not
/// represented here: both are ordinary outcomes of a registry lookup.
#[derive(Debug, Error)]
pub enum QuireError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// An extension name was rejected at registration.
    #[error("invalid extension name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A version constraint string could not be parsed.
    #[error(transparent)]
    ConstraintParse(#[from] ConstraintParseError),

    /// A deferred extension initializer failed while being loaded.
    ///
    /// The entry stays deferred, so a later load may retry.
    #[error("extension `{name}` failed to initialize: {source}")]
    Factory {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A discovered package failed while being activated.
    #[error("failed to activate package `{package}`: {source}")]
    Activation {
        package: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An extension marker manifest could not be read or parsed.
    #[error("invalid extension manifest {path}: {message}")]
    Manifest { path: String, message: String },

    /// Package enumeration failed as a whole.
    #[error("discovery error: {message}")]
    Discovery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP server bind or serve errors.
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
