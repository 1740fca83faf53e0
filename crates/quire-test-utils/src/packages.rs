// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package listers and on-disk package fixtures.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use quire_core::QuireError;
use quire_plugin::{DirectoryPackageLister, PackageLister, PackageSpec, EXTENSION_FILE};

/// In-memory [`PackageLister`] returning a fixed list, counting its calls.
#[derive(Debug, Default)]
pub struct FakePackageLister {
    specs: Vec<PackageSpec>,
    calls: Mutex<usize>,
}

impl FakePackageLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an installed package. `version` must be full semver.
    pub fn with_package(mut self, name: &str, version: &str, root: impl Into<PathBuf>) -> Self {
        let version = semver::Version::parse(version).expect("test package version");
        self.specs.push(PackageSpec::new(name, version, root));
        self
    }

    /// How many times the package list was requested.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("lister call counter")
    }
}

impl PackageLister for FakePackageLister {
    fn installed_packages(&self) -> Result<Vec<PackageSpec>, QuireError> {
        *self.calls.lock().expect("lister call counter") += 1;
        Ok(self.specs.clone())
    }
}

/// Temporary directory laid out like an installed package store.
///
/// Each package lives in `<root>/<name>-<version>/`. The directory is
/// removed when the tree is dropped.
pub struct PackageTree {
    dir: tempfile::TempDir,
}

impl PackageTree {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a package without the extension marker.
    pub fn package(&self, name: &str, version: &str) -> std::io::Result<PathBuf> {
        let root = self.dir.path().join(format!("{name}-{version}"));
        std::fs::create_dir_all(root.join("lib"))?;
        Ok(root)
    }

    /// Create a package whose marker file contains `manifest`.
    pub fn extension_package(
        &self,
        name: &str,
        version: &str,
        manifest: &str,
    ) -> std::io::Result<PathBuf> {
        let root = self.package(name, version)?;
        std::fs::write(root.join(EXTENSION_FILE), manifest)?;
        Ok(root)
    }

    /// A lister over this tree.
    pub fn lister(&self) -> DirectoryPackageLister {
        DirectoryPackageLister::new([self.dir.path()])
    }
}
