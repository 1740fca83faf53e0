// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of extension packages installed next to the framework.
//!
//! Discovery asks a [`PackageLister`] for the installed packages, keeps the
//! latest version of each, and activates every package whose tree contains
//! the marker file [`EXTENSION_FILE`]. Activation is delegated to a
//! [`PackageActivator`], which is expected to register the package's
//! extensions in the registry.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_core::QuireError;
use semver::Version;
use tracing::{debug, error, info, warn};

use crate::manifest::read_extension_manifest;
use crate::registry::{ExtensionRegistry, Provider, Registration};

/// Marker file, relative to a package root, that opts a package into discovery.
pub const EXTENSION_FILE: &str = "lib/quire_extension.toml";

/// One installed package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Version,
    /// Root directory of the installed package.
    pub root: PathBuf,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, version: Version, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version,
            root: root.into(),
        }
    }

    /// Whether `relative` exists inside this package's tree.
    pub fn has_file(&self, relative: &str) -> std::io::Result<bool> {
        self.root.join(relative).try_exists()
    }
}

/// Source of installed package specs.
pub trait PackageLister: Send + Sync {
    /// Lists installed packages. May return several versions of one package.
    fn installed_packages(&self) -> Result<Vec<PackageSpec>, QuireError>;
}

impl<T: PackageLister + ?Sized> PackageLister for Arc<T> {
    fn installed_packages(&self) -> Result<Vec<PackageSpec>, QuireError> {
        (**self).installed_packages()
    }
}

/// Runs a discovered package's self-registration.
pub trait PackageActivator: Send + Sync {
    fn activate(&self, spec: &PackageSpec, registry: &ExtensionRegistry) -> Result<(), QuireError>;
}

impl<F> PackageActivator for F
where
    F: Fn(&PackageSpec, &ExtensionRegistry) -> Result<(), QuireError> + Send + Sync,
{
    fn activate(&self, spec: &PackageSpec, registry: &ExtensionRegistry) -> Result<(), QuireError> {
        self(spec, registry)
    }
}

/// Reduce `specs` to the highest version of each package name, sorted by name.
pub fn latest_specs(specs: Vec<PackageSpec>) -> Vec<PackageSpec> {
    let mut latest: BTreeMap<String, PackageSpec> = BTreeMap::new();
    for spec in specs {
        match latest.get(&spec.name) {
            Some(current) if current.version >= spec.version => {}
            _ => {
                latest.insert(spec.name.clone(), spec);
            }
        }
    }
    latest.into_values().collect()
}

/// Lists packages installed as `<search path>/<name>-<version>/` directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPackageLister {
    search_paths: Vec<PathBuf>,
}

impl DirectoryPackageLister {
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn list_dir(&self, dir: &Path, out: &mut Vec<PackageSpec>) -> Result<(), QuireError> {
        let entries = std::fs::read_dir(dir).map_err(|e| QuireError::Discovery {
            message: format!("cannot read package directory {}", dir.display()),
            source: Some(Box::new(e)),
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match split_package_dir(dir_name) {
                Some((name, version)) => out.push(PackageSpec::new(name, version, path.clone())),
                None => debug!(dir = %path.display(), "not a package directory, skipping"),
            }
        }
        Ok(())
    }
}

impl PackageLister for DirectoryPackageLister {
    fn installed_packages(&self) -> Result<Vec<PackageSpec>, QuireError> {
        let mut specs = Vec::new();
        for dir in &self.search_paths {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "package search path missing, skipping");
                continue;
            }
            self.list_dir(dir, &mut specs)?;
        }
        Ok(specs)
    }
}

/// Split `quire-blog-1.2.0` into `("quire-blog", 1.2.0)`.
///
/// Dashes are tried from the right and the first split whose tail is a full
/// semver version wins, so `blog-2.0.0-beta.1` keeps its prerelease. Only
/// when no tail parses are versions with fewer than three segments padded
/// with zeros.
pub fn split_package_dir(dir_name: &str) -> Option<(String, Version)> {
    let splits = || {
        dir_name
            .rmatch_indices('-')
            .map(move |(i, _)| (&dir_name[..i], &dir_name[i + 1..]))
            .filter(|(name, _)| !name.is_empty())
    };

    splits()
        .find_map(|(name, version)| Some((name, Version::parse(version).ok()?)))
        .or_else(|| splits().find_map(|(name, version)| Some((name, short_version(version)?))))
        .map(|(name, version)| (name.to_string(), version))
}

/// Parse `2` or `2.1` as `2.0.0` or `2.1.0`.
fn short_version(version: &str) -> Option<Version> {
    let parts = version
        .split('.')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<u64>>>()?;
    match parts.as_slice() {
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        _ => None,
    }
}

/// Activates packages by reading their marker file as an extension manifest.
///
/// Each declared extension is registered as a ready value, gated by its
/// `requires` constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestActivator;

impl PackageActivator for ManifestActivator {
    fn activate(&self, spec: &PackageSpec, registry: &ExtensionRegistry) -> Result<(), QuireError> {
        let manifest = read_extension_manifest(&spec.root.join(EXTENSION_FILE))?;
        for declared in manifest.extensions {
            let name = declared.name.clone();
            let requires = declared.requires.clone();
            let outcome =
                registry.register(&name, Provider::Namespace(Arc::new(declared)), requires.as_deref())?;
            if outcome == Registration::AlreadyRegistered {
                debug!(package = %spec.name, extension = %name, "extension name already taken");
            }
        }
        Ok(())
    }
}

/// Options controlling a discovery run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Log and skip packages whose activation fails instead of aborting.
    pub isolate_activation: bool,
    /// Package names never activated.
    pub disabled: Vec<String>,
}

/// Why a package was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    /// Checking for the marker file failed.
    MarkerCheck(String),
    /// Activation failed and activation is isolated.
    ActivationFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "disabled"),
            SkipReason::MarkerCheck(e) => write!(f, "marker check failed: {e}"),
            SkipReason::ActivationFailed(e) => write!(f, "activation failed: {e}"),
        }
    }
}

/// A package passed over during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    pub name: String,
    pub reason: SkipReason,
}

/// Summary of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Latest-version packages checked for the marker file.
    pub scanned: Vec<PackageSpec>,
    /// Names of packages that were activated.
    pub activated: Vec<String>,
    pub skipped: Vec<SkippedPackage>,
}

/// Scans installed packages and activates those carrying the marker file.
pub struct Discoverer {
    lister: Box<dyn PackageLister>,
    activator: Box<dyn PackageActivator>,
    options: DiscoveryOptions,
}

impl Discoverer {
    pub fn new(
        lister: impl PackageLister + 'static,
        activator: impl PackageActivator + 'static,
    ) -> Self {
        Self {
            lister: Box::new(lister),
            activator: Box::new(activator),
            options: DiscoveryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan installed packages and activate every one that has the marker.
    ///
    /// A failed marker check skips only that package. A failed activation
    /// aborts the run with [`QuireError::Activation`] unless
    /// `isolate_activation` is set. Running this twice is safe: the
    /// registry ignores repeated registrations.
    pub fn discover_and_activate(
        &self,
        registry: &ExtensionRegistry,
    ) -> Result<DiscoveryReport, QuireError> {
        let installed = self.lister.installed_packages()?;
        let latest = latest_specs(installed);
        info!(packages = latest.len(), "scanning installed packages for extensions");

        let mut report = DiscoveryReport::default();
        for spec in latest {
            if self.options.disabled.iter().any(|d| d == &spec.name) {
                debug!(package = %spec.name, "package disabled, skipping");
                report.skipped.push(SkippedPackage {
                    name: spec.name,
                    reason: SkipReason::Disabled,
                });
                continue;
            }

            let has_marker = spec.has_file(EXTENSION_FILE);
            report.scanned.push(spec.clone());
            match has_marker {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(package = %spec.name, error = %e, "could not check for extension marker");
                    report.skipped.push(SkippedPackage {
                        name: spec.name,
                        reason: SkipReason::MarkerCheck(e.to_string()),
                    });
                    continue;
                }
            }

            info!(package = %spec.name, version = %spec.version, "activating extension package");
            match self.activator.activate(&spec, registry) {
                Ok(()) => report.activated.push(spec.name),
                Err(e) if self.options.isolate_activation => {
                    error!(package = %spec.name, error = %e, "extension package failed to activate");
                    report.skipped.push(SkippedPackage {
                        name: spec.name,
                        reason: SkipReason::ActivationFailed(e.to_string()),
                    });
                }
                Err(e) => {
                    return Err(QuireError::Activation {
                        package: spec.name,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!(
            activated = report.activated.len(),
            skipped = report.skipped.len(),
            "extension discovery finished"
        );
        Ok(report)
    }
}

impl fmt::Debug for Discoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discoverer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StaticLister(Vec<PackageSpec>);

    impl PackageLister for StaticLister {
        fn installed_packages(&self) -> Result<Vec<PackageSpec>, QuireError> {
            Ok(self.0.clone())
        }
    }

    fn spec(name: &str, version: &str, root: &Path) -> PackageSpec {
        PackageSpec::new(name, Version::parse(version).unwrap(), root)
    }

    fn with_marker(root: &Path, body: &str) {
        let lib = root.join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("quire_extension.toml"), body).unwrap();
    }

    #[test]
    fn latest_specs_keeps_highest_version_per_name() {
        let root = Path::new("/pkgs");
        let latest = latest_specs(vec![
            spec("blog", "1.0.0", root),
            spec("blog", "1.10.0", root),
            spec("blog", "1.2.0", root),
            spec("assets", "0.1.0", root),
        ]);
        let summary: Vec<(String, String)> = latest
            .iter()
            .map(|s| (s.name.clone(), s.version.to_string()))
            .collect();
        assert_eq!(
            summary,
            [
                ("assets".to_string(), "0.1.0".to_string()),
                ("blog".to_string(), "1.10.0".to_string())
            ]
        );
    }

    #[test]
    fn split_package_dir_handles_dashed_names_and_short_versions() {
        assert_eq!(
            split_package_dir("quire-blog-1.2.3"),
            Some(("quire-blog".to_string(), Version::new(1, 2, 3)))
        );
        assert_eq!(
            split_package_dir("lorem-2.1"),
            Some(("lorem".to_string(), Version::new(2, 1, 0)))
        );
        assert_eq!(split_package_dir("no_version"), None);
        assert_eq!(split_package_dir("-1.0.0"), None);
        assert_eq!(split_package_dir("blog-latest"), None);
    }

    #[test]
    fn split_package_dir_keeps_prerelease_and_build_suffixes_in_the_version() {
        assert_eq!(
            split_package_dir("blog-2.0.0-beta.1"),
            Some(("blog".to_string(), Version::parse("2.0.0-beta.1").unwrap()))
        );
        assert_eq!(
            split_package_dir("blog-1.0.0-1"),
            Some(("blog".to_string(), Version::parse("1.0.0-1").unwrap()))
        );
        assert_eq!(
            split_package_dir("quire-blog-0.3.0-rc.2"),
            Some(("quire-blog".to_string(), Version::parse("0.3.0-rc.2").unwrap()))
        );
    }

    #[test]
    fn suffixed_directories_collapse_to_one_latest_package() {
        let specs = ["blog-1.0.0", "blog-1.0.0-1", "blog-2.0.0-beta.1"]
            .into_iter()
            .map(|dir| {
                let (name, version) = split_package_dir(dir).unwrap();
                PackageSpec::new(name, version, dir)
            })
            .collect();
        let latest = latest_specs(specs);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].version, Version::parse("2.0.0-beta.1").unwrap());
    }

    #[test]
    fn directory_lister_reads_gem_style_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("blog-1.0.0")).unwrap();
        std::fs::create_dir(dir.path().join("blog-1.1.0")).unwrap();
        std::fs::create_dir(dir.path().join("cache")).unwrap();
        std::fs::write(dir.path().join("notes-1.0.0"), "a file, not a package").unwrap();

        let lister = DirectoryPackageLister::new([dir.path(), Path::new("/does/not/exist")]);
        let mut specs = lister.installed_packages().unwrap();
        specs.sort_by(|a, b| a.version.cmp(&b.version));
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].version, Version::new(1, 1, 0));
        assert_eq!(specs[1].root, dir.path().join("blog-1.1.0"));
    }

    #[test]
    fn only_latest_version_is_checked_for_marker() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("blog-1.0.0");
        let new = dir.path().join("blog-2.0.0");
        std::fs::create_dir_all(&new).unwrap();
        with_marker(&old, "[[extension]]\nname = \"blog\"\n");

        let registry = ExtensionRegistry::with_framework_version(Version::new(1, 0, 0));
        let report = Discoverer::new(DirectoryPackageLister::new([dir.path()]), ManifestActivator)
            .discover_and_activate(&registry)
            .unwrap();

        assert_eq!(report.scanned.len(), 1);
        assert_eq!(report.scanned[0].root, new);
        assert!(report.activated.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn manifest_activator_registers_declared_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("blog-0.3.0");
        with_marker(
            &root,
            "[[extension]]\nname = \"blog\"\nrequires = \">= 1.0\"\n\n[[extension]]\nname = \"future\"\nrequires = \">= 5.0\"\n",
        );

        let registry = ExtensionRegistry::with_framework_version(Version::new(1, 2, 3));
        let report = Discoverer::new(DirectoryPackageLister::new([dir.path()]), ManifestActivator)
            .discover_and_activate(&registry)
            .unwrap();

        assert_eq!(report.activated, ["blog"]);
        assert!(registry.load("blog").unwrap().is_found());
        assert!(matches!(
            registry.load("future").unwrap(),
            crate::registry::Lookup::Unavailable { .. }
        ));
    }

    #[test]
    fn marker_check_error_skips_only_that_package() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good-1.0.0");
        with_marker(&good, "");
        let lister = StaticLister(vec![
            spec("broken", "1.0.0", Path::new("bad\0root")),
            spec("good", "1.0.0", &good),
        ]);

        let registry = ExtensionRegistry::new();
        let report = Discoverer::new(lister, ManifestActivator)
            .discover_and_activate(&registry)
            .unwrap();

        assert_eq!(report.activated, ["good"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "broken");
        assert!(matches!(report.skipped[0].reason, SkipReason::MarkerCheck(_)));
    }

    #[test]
    fn activation_failure_is_fatal_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("bad-1.0.0");
        with_marker(&root, "this is = = not toml");

        let registry = ExtensionRegistry::new();
        let err = Discoverer::new(DirectoryPackageLister::new([dir.path()]), ManifestActivator)
            .discover_and_activate(&registry)
            .unwrap_err();
        assert!(matches!(err, QuireError::Activation { ref package, .. } if package == "bad"));
    }

    #[test]
    fn isolated_activation_failure_is_recorded_and_scan_continues() {
        let dir = tempfile::tempdir().unwrap();
        with_marker(&dir.path().join("bad-1.0.0"), "not = = toml");
        with_marker(&dir.path().join("good-1.0.0"), "[[extension]]\nname = \"good\"\n");

        let registry = ExtensionRegistry::new();
        let report = Discoverer::new(DirectoryPackageLister::new([dir.path()]), ManifestActivator)
            .with_options(DiscoveryOptions {
                isolate_activation: true,
                ..Default::default()
            })
            .discover_and_activate(&registry)
            .unwrap();

        assert_eq!(report.activated, ["good"]);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::ActivationFailed(_)
        ));
    }

    #[test]
    fn disabled_packages_are_not_activated() {
        let dir = tempfile::tempdir().unwrap();
        with_marker(&dir.path().join("blog-1.0.0"), "[[extension]]\nname = \"blog\"\n");

        let registry = ExtensionRegistry::new();
        let report = Discoverer::new(DirectoryPackageLister::new([dir.path()]), ManifestActivator)
            .with_options(DiscoveryOptions {
                disabled: vec!["blog".to_string()],
                ..Default::default()
            })
            .discover_and_activate(&registry)
            .unwrap();

        assert!(report.scanned.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::Disabled);
        assert!(!registry.contains("blog"));
    }

    #[test]
    fn closure_activator_and_repeated_runs_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        with_marker(&dir.path().join("hooked-1.0.0"), "");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_hook = Arc::clone(&seen);

        let discoverer = Discoverer::new(
            DirectoryPackageLister::new([dir.path()]),
            move |spec: &PackageSpec, registry: &ExtensionRegistry| {
                seen_by_hook.lock().unwrap().push(spec.name.clone());
                registry.register(
                    "hooked",
                    Provider::value(crate::manifest::DeclaredExtension {
                        name: "hooked".into(),
                        version: Version::new(1, 0, 0),
                        requires: None,
                        description: String::new(),
                        settings: Default::default(),
                    }),
                    None,
                )?;
                Ok(())
            },
        );

        let registry = ExtensionRegistry::new();
        discoverer.discover_and_activate(&registry).unwrap();
        discoverer.discover_and_activate(&registry).unwrap();

        assert_eq!(*seen.lock().unwrap(), ["hooked", "hooked"]);
        assert_eq!(registry.len(), 1);
    }
}
