// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension registry, package discovery, and built-in extension catalog.
//!
//! Extensions register under a unique name, optionally gated by a framework
//! version constraint, either as ready values or as factories resolved on
//! first load. Packages installed next to the framework opt into automatic
//! registration by shipping the [`EXTENSION_FILE`] marker.

pub mod bootstrap;
pub mod catalog;
pub mod discovery;
pub mod manifest;
pub mod registry;

pub use bootstrap::Bootstrap;
pub use catalog::{builtin_catalog, register_builtins, search_catalog, BuiltinExtension};
pub use discovery::{
    latest_specs, Discoverer, DirectoryPackageLister, DiscoveryOptions, DiscoveryReport,
    ManifestActivator, PackageActivator, PackageLister, PackageSpec, SkipReason, SkippedPackage,
    EXTENSION_FILE,
};
pub use manifest::{parse_extension_manifest, read_extension_manifest, DeclaredExtension, ExtensionManifest};
pub use registry::{EntryStatus, ExtensionRegistry, Lookup, Provider, Registration};
