// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Quire integration tests.
//!
//! Provides stand-ins for the pieces of the extension subsystem that touch
//! the outside world, so registry and discovery behavior can be tested
//! deterministically.
//!
//! # Components
//!
//! - [`StubExtension`] - Minimal extension value
//! - [`counting_factory`] - Factory provider that counts its invocations
//! - [`FakePackageLister`] - In-memory package lister
//! - [`PackageTree`] - Temporary on-disk package directory

pub mod extensions;
pub mod packages;

pub use extensions::{counting_factory, failing_factory, StubExtension};
pub use packages::{FakePackageLister, PackageTree};
