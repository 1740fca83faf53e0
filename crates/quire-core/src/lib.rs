// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quire site framework.
//!
//! This crate provides the error type, the [`Extension`] trait implemented by
//! every pluggable unit of functionality, and the version gate used to decide
//! whether an extension is compatible with the running framework.

pub mod error;
pub mod extension;
pub mod types;
pub mod version;

// Re-export key items at crate root for ergonomic imports.
pub use error::QuireError;
pub use extension::Extension;
pub use types::{EntryState, Settings};
pub use version::{framework_version, satisfies, ConstraintParseError, VersionConstraint};
